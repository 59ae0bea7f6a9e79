use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("No trained model artifact at [{}]; run training first", path.display())]
    NotFound {
        path: PathBuf
    },
    #[error("Artifact I/O failed at [{}]: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error
    },
    #[error("Artifact at [{}] could not be (de)serialized: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error
    },
    #[error("Artifact is unusable: {reason}")]
    Incompatible {
        reason: String
    }
}

impl ArtifactError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }

    pub fn serialization(path: &std::path::Path, source: serde_json::Error) -> Self {
        Self::Serialization { path: path.to_path_buf(), source }
    }

    pub fn incompatible(reason: impl Into<String>) -> Self {
        Self::Incompatible { reason: reason.into() }
    }
}
