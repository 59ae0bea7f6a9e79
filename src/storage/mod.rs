mod artifact;
mod errors;
mod file_store;

use std::sync::Arc;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT_VERSION};
pub use errors::ArtifactError;
pub use file_store::FileArtifactStore;

/// Persistence seam for the single trained artifact.
pub trait ArtifactStore {
    fn load(&self) -> Result<ModelArtifact, ArtifactError>;
    fn save(&self, artifact: &ModelArtifact) -> Result<(), ArtifactError>;
}

impl<S: ArtifactStore + ?Sized> ArtifactStore for Arc<S> {
    fn load(&self) -> Result<ModelArtifact, ArtifactError> {
        (**self).load()
    }

    fn save(&self, artifact: &ModelArtifact) -> Result<(), ArtifactError> {
        (**self).save(artifact)
    }
}
