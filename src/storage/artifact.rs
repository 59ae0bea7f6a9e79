use serde::{Deserialize, Serialize};

use crate::encoder::EncoderState;
use crate::models::RandomForest;
use crate::storage::errors::ArtifactError;

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// A trained forest paired with the encoder state it was trained against.
///
/// The pairing is enforced at construction and again on load: the forest's
/// feature names must equal the encoder's canonical column list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    format_version: u32,
    encoder: EncoderState,
    forest: RandomForest
}

impl ModelArtifact {
    pub fn new(forest: RandomForest, encoder: EncoderState) -> Result<Self, ArtifactError> {
        let artifact = Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            encoder,
            forest
        };

        artifact.validate()?;

        Ok(artifact)
    }

    pub fn encoder(&self) -> &EncoderState {
        &self.encoder
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    /// Encoded columns the model expects, in order.
    pub fn expected_columns(&self) -> &[String] {
        self.encoder.columns()
    }

    pub(crate) fn validate(&self) -> Result<(), ArtifactError> {
        if self.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ArtifactError::incompatible(format!(
                "format version {} is not supported (expected {})",
                self.format_version, ARTIFACT_FORMAT_VERSION
            )))
        }

        if !self.encoder.is_consistent() {
            return Err(ArtifactError::incompatible("encoder column list does not match its vocabularies"))
        }

        if self.forest.feature_names() != self.encoder.columns() {
            return Err(ArtifactError::incompatible(format!(
                "forest was trained on {} columns but the encoder produces {}",
                self.forest.feature_names().len(),
                self.encoder.columns().len()
            )))
        }

        if !self.forest.is_consistent() {
            return Err(ArtifactError::incompatible("forest has no trees or a malformed tree"))
        }

        Ok(())
    }
}
