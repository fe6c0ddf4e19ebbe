//! Command-line interface definitions.
//!
//! Every option is optional: anything not given on the command line falls
//! back to the YAML config file, then to built-in defaults (see
//! [`crate::config`]).

use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Import new posts from an Atom feed into a journal.
///
/// # Examples
///
/// ```sh
/// # Use ~/.feed_journal/config.yaml (or defaults)
/// feed_journal
///
/// # Override the feed and journal for one run
/// feed_journal --feed-url https://blog.example/?feed=atom --journal Blog -t imported -t blog
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a YAML config file (default: <data-dir>/config.yaml, if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory holding the marker file and downloaded images
    #[arg(short, long, env = "FEED_JOURNAL_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Atom feed to import from
    #[arg(short, long, env = "FEED_JOURNAL_FEED_URL")]
    pub feed_url: Option<String>,

    /// Target journal name
    #[arg(short, long)]
    pub journal: Option<String>,

    /// Tag to apply to every imported entry (repeatable)
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// Journaling executable to invoke
    #[arg(long)]
    pub journal_command: Option<String>,

    /// Skip entries published before this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,
}
