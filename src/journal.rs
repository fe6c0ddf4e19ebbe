//! Hand-off of finished entries to the external journaling tool.
//!
//! The production [`DayOneCli`] spawns the configured command as
//!
//! ```text
//! <command> new --date <published> --journal <name> --tags <tag>... [-a <path>...]
//! ```
//!
//! and streams the Markdown body to its stdin.

use crate::error::PipelineError;
use crate::models::JournalEntry;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

/// Capability to store one dated entry in a journal.
pub trait Journal {
    async fn create_entry(&self, entry: &JournalEntry) -> Result<(), PipelineError>;
}

#[derive(Debug, Clone)]
pub struct DayOneCli {
    command: String,
}

impl DayOneCli {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    /// Arguments passed after the command name.
    pub fn args(entry: &JournalEntry) -> Vec<String> {
        let mut args = vec![
            "new".to_string(),
            "--date".to_string(),
            entry.date.clone(),
            "--journal".to_string(),
            entry.journal.clone(),
            "--tags".to_string(),
        ];
        args.extend(entry.tags.iter().cloned());
        if !entry.attachments.is_empty() {
            args.push("-a".to_string());
            args.extend(
                entry
                    .attachments
                    .iter()
                    .map(|p| p.to_string_lossy().into_owned()),
            );
        }
        args
    }

    fn error(&self, source: std::io::Error) -> PipelineError {
        PipelineError::Subprocess {
            command: self.command.clone(),
            source,
        }
    }
}

impl Journal for DayOneCli {
    /// The tool's exit status is logged but never turned into an error.
    #[instrument(level = "info", skip_all, fields(command = %self.command, date = %entry.date))]
    async fn create_entry(&self, entry: &JournalEntry) -> Result<(), PipelineError> {
        let args = Self::args(entry);
        debug!(?args, "Spawning journaling tool");

        let mut child = Command::new(&self.command)
            .args(&args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| self.error(e))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(entry.content.as_bytes()).await {
                Ok(()) => {}
                // tool exited without reading its input; its status tells the rest
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    warn!(error = %e, "Journaling tool closed stdin early");
                }
                Err(e) => return Err(self.error(e)),
            }
            // closing stdin signals end of entry body
            drop(stdin);
        }

        let status = child.wait().await.map_err(|e| self.error(e))?;
        if !status.success() {
            warn!(%status, "Journaling tool exited unsuccessfully");
        }
        Ok(())
    }
}
