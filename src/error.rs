//! Error taxonomy for an import run.
//!
//! Every failure the pipeline can hit falls into one of four categories:
//! transport, malformed input, local filesystem, or the external journaling
//! process. [`PipelineError::kind`] exposes the category so callers can branch
//! on it without matching every variant payload.

use std::path::PathBuf;
use thiserror::Error;

/// Failure category of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Malformed,
    Filesystem,
    Subprocess,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorKind::Network => "network",
            ErrorKind::Malformed => "malformed",
            ErrorKind::Filesystem => "filesystem",
            ErrorKind::Subprocess => "subprocess",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Feed or image request failed, or returned a non-success status.
    #[error("request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Feed document, entry field, or persisted marker could not be understood.
    #[error("malformed {what}: {detail}")]
    Malformed { what: &'static str, detail: String },

    /// Marker or image path could not be read, written, or removed.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The journaling tool could not be spawned or fed its input.
    #[error("journaling command `{command}` failed: {source}")]
    Subprocess {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Network { .. } => ErrorKind::Network,
            PipelineError::Malformed { .. } => ErrorKind::Malformed,
            PipelineError::Filesystem { .. } => ErrorKind::Filesystem,
            PipelineError::Subprocess { .. } => ErrorKind::Subprocess,
        }
    }

    pub(crate) fn network(
        url: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        PipelineError::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    pub(crate) fn malformed(what: &'static str, detail: impl Into<String>) -> Self {
        PipelineError::Malformed {
            what,
            detail: detail.into(),
        }
    }

    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Filesystem {
            path: path.into(),
            source,
        }
    }
}
