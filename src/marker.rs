//! Persistence of the last-execution marker.
//!
//! The marker is a single text file holding one ISO-8601 timestamp: the
//! published time of the newest entry imported so far.

use crate::error::PipelineError;
use crate::models::Timestamp;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone)]
pub struct MarkerStore {
    path: PathBuf,
}

impl MarkerStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted marker. `Ok(None)` when no marker file exists yet.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display()))]
    pub async fn read(&self) -> Result<Option<Timestamp>, PipelineError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No marker file; treating as first run");
                return Ok(None);
            }
            Err(e) => return Err(PipelineError::fs(&self.path, e)),
        };
        let marker = raw.trim().parse::<Timestamp>()?;
        debug!(%marker, "Loaded marker");
        Ok(Some(marker))
    }

    /// Overwrite the marker, creating the parent directory if needed.
    #[instrument(level = "debug", skip_all, fields(path = %self.path.display(), %timestamp))]
    pub async fn write(&self, timestamp: &Timestamp) -> Result<(), PipelineError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::fs(parent, e))?;
        }
        fs::write(&self.path, timestamp.to_string())
            .await
            .map_err(|e| PipelineError::fs(&self.path, e))?;
        info!(%timestamp, "Advanced marker");
        Ok(())
    }
}
