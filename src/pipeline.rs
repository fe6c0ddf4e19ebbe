//! The import run.
//!
//! A run walks these stages in order, strictly one entry at a time:
//!
//! 1. **Load marker**: read the last-execution timestamp (absent on first run)
//! 2. **Fetch / parse**: download the feed and decode every entry
//! 3. **Per entry**, in feed order: filter on the marker, convert the body to
//!    Markdown, download the first JPEG, publish to the journal
//! 4. **Advance**: if anything was imported, write the newest published time
//!    as the new marker
//! 5. **Clean**: empty the image directory
//!
//! Any error aborts the run at the point it happens. Entries already
//! published stay published, but the marker is not advanced, so they are
//! imported again on the next run.

use crate::config::Config;
use crate::convert::{format_entry, to_markdown};
use crate::error::PipelineError;
use crate::feed::parse_feed;
use crate::fetch::FeedSource;
use crate::images::ImageStore;
use crate::journal::Journal;
use crate::marker::MarkerStore;
use crate::models::{Entry, JournalEntry, Timestamp};
use crate::utils::{ensure_writable_dir, truncate_for_log};
use tracing::{debug, info, instrument};

/// Outcome of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub imported: usize,
    pub skipped: usize,
    /// Marker value after the run.
    pub marker: Option<Timestamp>,
}

pub struct Importer<'a, S, J> {
    config: &'a Config,
    source: &'a S,
    journal: &'a J,
    marker: MarkerStore,
    images: ImageStore,
}

impl<'a, S: FeedSource, J: Journal> Importer<'a, S, J> {
    pub fn new(config: &'a Config, source: &'a S, journal: &'a J) -> Self {
        Self {
            config,
            source,
            journal,
            marker: MarkerStore::new(config.marker_path()),
            images: ImageStore::new(config.image_dir(), Some(&config.feed_url)),
        }
    }

    #[instrument(level = "info", skip_all, fields(feed_url = %self.config.feed_url))]
    pub async fn run(&self) -> Result<RunSummary, PipelineError> {
        ensure_writable_dir(&self.config.data_dir).await?;
        ensure_writable_dir(self.images.dir()).await?;

        let last = self.marker.read().await?;
        info!(
            marker = ?last.map(|t| t.to_string()),
            marker_path = %self.marker.path().display(),
            "Starting import"
        );

        let bytes = self.source.get(&self.config.feed_url).await?;
        let entries = parse_feed(&bytes)?;

        let mut latest: Option<Timestamp> = None;
        let mut imported = 0;
        let mut skipped = 0;
        for entry in &entries {
            if !self.is_new(entry, last.as_ref()) {
                debug!(published = %entry.published, title = %entry.title, "Skipping already imported entry");
                skipped += 1;
                continue;
            }
            self.import(entry).await?;
            imported += 1;
            if latest.is_none_or(|l| entry.published_at > l) {
                latest = Some(entry.published_at);
            }
        }

        let marker = match latest {
            Some(latest) => {
                self.marker.write(&latest).await?;
                self.images.clear().await?;
                Some(latest)
            }
            None => {
                info!("No new entries");
                last
            }
        };

        info!(imported, skipped, "Import finished");
        Ok(RunSummary {
            imported,
            skipped,
            marker,
        })
    }

    /// Strictly newer than the marker, and not before the `since` floor.
    fn is_new(&self, entry: &Entry, last: Option<&Timestamp>) -> bool {
        let after_marker = last.is_none_or(|m| entry.published_at > *m);
        let after_floor = self
            .config
            .since
            .is_none_or(|d| entry.published_at.instant().date_naive() >= d);
        after_marker && after_floor
    }

    #[instrument(level = "info", skip_all, fields(published = %entry.published))]
    async fn import(&self, entry: &Entry) -> Result<(), PipelineError> {
        let markdown = to_markdown(&entry.html_body);
        let content = format_entry(&entry.title, &markdown);
        debug!(preview = %truncate_for_log(&content, 200), "Converted entry");

        let image = self
            .images
            .download(
                self.source,
                entry.image_url.as_deref(),
                entry.published_date(),
            )
            .await?;

        self.journal
            .create_entry(&JournalEntry {
                date: entry.published.clone(),
                content,
                journal: self.config.journal.clone(),
                tags: self.config.tags.clone(),
                attachments: image.into_iter().collect(),
            })
            .await?;

        info!(published = %entry.published, title = %entry.title, "Entry added");
        Ok(())
    }
}
