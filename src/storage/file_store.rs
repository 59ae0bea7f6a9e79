use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::storage::artifact::ModelArtifact;
use crate::storage::errors::ArtifactError;
use crate::storage::ArtifactStore;

#[derive(Debug, Clone)]
pub struct FileArtifactStore {
    path: PathBuf
}

impl FileArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into()
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl ArtifactStore for FileArtifactStore {
    fn load(&self) -> Result<ModelArtifact, ArtifactError> {
        let file = File::open(&self.path).map_err(|error| match error.kind() {
            ErrorKind::NotFound => ArtifactError::NotFound { path: self.path.clone() },
            _ => ArtifactError::io(&self.path, error)
        })?;

        let artifact: ModelArtifact = serde_json::from_reader(BufReader::new(file))
            .map_err(|error| ArtifactError::serialization(&self.path, error))?;

        artifact.validate()?;

        debug!("Loaded model artifact from {}", self.path.display());

        Ok(artifact)
    }

    /// Writes to a sibling staging file and renames it into place, so readers
    /// never observe a partially written artifact.
    fn save(&self, artifact: &ModelArtifact) -> Result<(), ArtifactError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|error| ArtifactError::io(parent, error))?;
        }

        let staging = self.staging_path();
        let file = File::create(&staging).map_err(|error| ArtifactError::io(&staging, error))?;
        let mut writer = BufWriter::new(file);

        serde_json::to_writer(&mut writer, artifact)
            .map_err(|error| ArtifactError::serialization(&staging, error))?;

        writer.flush().map_err(|error| ArtifactError::io(&staging, error))?;
        writer.get_ref().sync_all().map_err(|error| ArtifactError::io(&staging, error))?;
        drop(writer);

        fs::rename(&staging, &self.path).map_err(|error| ArtifactError::io(&self.path, error))?;

        info!("Saved model artifact to {}", self.path.display());

        Ok(())
    }
}
