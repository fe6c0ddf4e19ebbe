//! # Feed Journal
//!
//! Imports new posts from a blog's Atom feed into a journaling application.
//! Each post's HTML body becomes Markdown under a `## Title` heading, its
//! first JPEG is downloaded and attached, and the result is handed to the
//! journaling tool (Day One's `dayone2` by default) as an entry dated with
//! the post's publish time.
//!
//! ## Usage
//!
//! ```sh
//! feed_journal --feed-url https://blog.example/?feed=atom --journal Blog
//! ```
//!
//! Meant to be run from a scheduler: a marker file remembers the publish
//! time of the newest imported post, and later runs only pick up posts
//! strictly newer than it.
//!
//! ## Architecture
//!
//! 1. **Marker**: load the last-execution timestamp ([`marker`])
//! 2. **Fetch / parse**: GET the feed and decode entries ([`fetch`], [`feed`])
//! 3. **Per entry**: convert ([`convert`]), download image ([`images`]),
//!    publish ([`journal`])
//! 4. **Advance / clean**: persist the new marker and empty the image directory
//!
//! A failed run logs the error and still exits 0.

use clap::Parser;
use std::error::Error;
use tracing::{error, info};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod convert;
mod error;
mod feed;
mod fetch;
mod images;
mod journal;
mod marker;
mod models;
mod pipeline;
mod utils;

use cli::Cli;
use fetch::HttpClient;
use journal::DayOneCli;
use pipeline::Importer;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("feed_journal starting up");

    let args = Cli::parse();
    let config = match config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Could not load configuration");
            return Err(e);
        }
    };

    let source = HttpClient::new()?;
    let journal = DayOneCli::new(config.journal_command.clone());

    match Importer::new(&config, &source, &journal).run().await {
        Ok(summary) => info!(
            imported = summary.imported,
            skipped = summary.skipped,
            marker = ?summary.marker.map(|t| t.to_string()),
            "Run complete"
        ),
        Err(e) => error!(
            kind = %e.kind(),
            error = %e,
            "An error occurred; marker not advanced"
        ),
    }

    let elapsed = start_time.elapsed();
    info!(?elapsed, "Execution complete");
    Ok(())
}
