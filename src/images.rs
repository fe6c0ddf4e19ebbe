//! Download and cleanup of entry images.
//!
//! Each imported entry with a JPEG reference gets its image saved as
//! `<YYYY-MM-DD>.jpg` in the image directory. Two entries published on the
//! same day share a file name; the second download overwrites the first,
//! which is harmless because each file is handed to the journal before the
//! next entry is processed.

use crate::error::PipelineError;
use crate::fetch::FeedSource;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};
use url::Url;

#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    base: Option<Url>,
}

impl ImageStore {
    /// `base` is used to resolve relative image references, normally the feed URL.
    pub fn new(dir: impl Into<PathBuf>, base: Option<&str>) -> Self {
        let base = base.and_then(|b| match Url::parse(b) {
            Ok(url) => Some(url),
            Err(e) => {
                warn!(base = b, error = %e, "Unusable base URL; relative images will not resolve");
                None
            }
        });
        Self {
            dir: dir.into(),
            base,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Resolve `image_url` against the base URL when it is relative.
    pub fn resolve(&self, image_url: &str) -> String {
        match &self.base {
            Some(base) => base
                .join(image_url)
                .map(|u| u.to_string())
                .unwrap_or_else(|_| image_url.to_string()),
            None => image_url.to_string(),
        }
    }

    /// Fetch `image_url` (if any) and store it under the entry's date.
    ///
    /// Returns the local path, or `None` without touching the network when
    /// there is no image.
    #[instrument(level = "info", skip_all, fields(image_url = ?image_url, %published_date))]
    pub async fn download<S: FeedSource>(
        &self,
        source: &S,
        image_url: Option<&str>,
        published_date: &str,
    ) -> Result<Option<PathBuf>, PipelineError> {
        let Some(image_url) = image_url else {
            return Ok(None);
        };

        let url = self.resolve(image_url);
        let bytes = source.get(&url).await?;

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PipelineError::fs(&self.dir, e))?;
        let path = self.dir.join(format!("{published_date}.jpg"));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| PipelineError::fs(&path, e))?;

        debug!(path = %path.display(), bytes = bytes.len(), "Saved image");
        Ok(Some(path))
    }

    /// Delete every regular file in the image directory, whichever run made it.
    #[instrument(level = "info", skip_all, fields(dir = %self.dir.display()))]
    pub async fn clear(&self) -> Result<usize, PipelineError> {
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(PipelineError::fs(&self.dir, e)),
        };

        let mut removed = 0;
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| PipelineError::fs(&self.dir, e))?
        {
            let path = item.path();
            let is_file = item
                .file_type()
                .await
                .map_err(|e| PipelineError::fs(&path, e))?
                .is_file();
            if is_file {
                fs::remove_file(&path)
                    .await
                    .map_err(|e| PipelineError::fs(&path, e))?;
                removed += 1;
            }
        }

        info!(removed, "All image files have been deleted");
        Ok(removed)
    }
}
