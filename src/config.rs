//! Run configuration.
//!
//! Values are layered: command-line flags win over the YAML config file,
//! which wins over built-in defaults. The resolved [`Config`] is passed
//! explicitly to the importer; nothing reads global state after startup.
//!
//! ```yaml
//! feed_url: https://blog.example/?feed=atom
//! journal: Wordpress Entries
//! tags: [imported by feed_journal]
//! journal_command: dayone2
//! since: 2024-01-01
//! ```

use crate::cli::Cli;
use chrono::NaiveDate;
use serde::Deserialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

pub const DEFAULT_FEED_URL: &str = "http://www.yoursite.org/?feed=atom";
pub const DEFAULT_JOURNAL: &str = "Wordpress Entries";
pub const DEFAULT_TAG: &str = "imported by feed_journal";
pub const DEFAULT_COMMAND: &str = "dayone2";

const CONFIG_FILE: &str = "config.yaml";
const MARKER_FILE: &str = "last_execution.txt";
const IMAGE_DIR: &str = "images";

/// Contents of the optional YAML file. Every key may be omitted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub feed_url: Option<String>,
    pub journal: Option<String>,
    pub tags: Option<Vec<String>>,
    pub journal_command: Option<String>,
    pub since: Option<NaiveDate>,
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub feed_url: String,
    pub journal: String,
    pub tags: Vec<String>,
    pub journal_command: String,
    pub since: Option<NaiveDate>,
    pub data_dir: PathBuf,
}

impl Config {
    /// Defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            journal: DEFAULT_JOURNAL.to_string(),
            tags: vec![DEFAULT_TAG.to_string()],
            journal_command: DEFAULT_COMMAND.to_string(),
            since: None,
            data_dir: data_dir.into(),
        }
    }

    pub fn marker_path(&self) -> PathBuf {
        self.data_dir.join(MARKER_FILE)
    }

    pub fn image_dir(&self) -> PathBuf {
        self.data_dir.join(IMAGE_DIR)
    }

    /// Layer `file` and then `cli` over the defaults.
    pub fn merge(cli: &Cli, file: FileConfig, default_data_dir: PathBuf) -> Self {
        let data_dir = cli
            .data_dir
            .clone()
            .or(file.data_dir)
            .unwrap_or(default_data_dir);
        let mut config = Config::with_data_dir(data_dir);

        if let Some(v) = cli.feed_url.clone().or(file.feed_url) {
            config.feed_url = v;
        }
        if let Some(v) = cli.journal.clone().or(file.journal) {
            config.journal = v;
        }
        if !cli.tags.is_empty() {
            config.tags = cli.tags.clone();
        } else if let Some(tags) = file.tags {
            config.tags = tags;
        }
        if let Some(v) = cli.journal_command.clone().or(file.journal_command) {
            config.journal_command = v;
        }
        config.since = cli.since.or(file.since);
        config
    }
}

/// `$HOME/.feed_journal`, if a home directory is known.
pub fn default_data_dir() -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".feed_journal"))
}

/// Parse a YAML config file.
pub fn read_file_config(path: &Path) -> Result<FileConfig, Box<dyn Error>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read config {}: {e}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(FileConfig::default());
    }
    let parsed = serde_yaml::from_str(&raw)
        .map_err(|e| format!("invalid config {}: {e}", path.display()))?;
    Ok(parsed)
}

/// Resolve the effective configuration for this invocation.
///
/// An explicit `--config` must exist; the implicit `<data-dir>/config.yaml`
/// is only read when present.
#[instrument(level = "info", skip_all)]
pub fn load(cli: &Cli) -> Result<Config, Box<dyn Error>> {
    let fallback_dir = match cli.data_dir.clone().or_else(default_data_dir) {
        Some(dir) => dir,
        None => return Err("no home directory; pass --data-dir or set FEED_JOURNAL_DIR".into()),
    };

    let file = match &cli.config {
        Some(path) => read_file_config(path)?,
        None => {
            let implicit = fallback_dir.join(CONFIG_FILE);
            if implicit.is_file() {
                read_file_config(&implicit)?
            } else {
                debug!(path = %implicit.display(), "No config file; using defaults");
                FileConfig::default()
            }
        }
    };

    let config = Config::merge(cli, file, fallback_dir);
    info!(
        feed_url = %config.feed_url,
        journal = %config.journal,
        tags = ?config.tags,
        data_dir = %config.data_dir.display(),
        "Loaded configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = Config::with_data_dir("/data");
        assert_eq!(config.feed_url, DEFAULT_FEED_URL);
        assert_eq!(config.tags, [DEFAULT_TAG]);
        assert_eq!(config.marker_path(), PathBuf::from("/data/last_execution.txt"));
        assert_eq!(config.image_dir(), PathBuf::from("/data/images"));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let file: FileConfig = serde_yaml::from_str(
            "feed_url: https://blog.example/?feed=atom\ntags: [a, b]\nsince: 2024-01-01\n",
        )
        .unwrap();
        let cli = Cli::parse_from(["feed_journal", "--data-dir", "/data"]);
        let config = Config::merge(&cli, file, PathBuf::from("/unused"));

        assert_eq!(config.feed_url, "https://blog.example/?feed=atom");
        assert_eq!(config.tags, ["a", "b"]);
        assert_eq!(config.journal, DEFAULT_JOURNAL);
        assert_eq!(config.since, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(config.data_dir, PathBuf::from("/data"));
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            journal: Some("From File".to_string()),
            tags: Some(vec!["file".to_string()]),
            data_dir: Some(PathBuf::from("/file-dir")),
            ..Default::default()
        };
        let cli = Cli::parse_from(["feed_journal", "-j", "From CLI", "-t", "cli"]);
        let config = Config::merge(&cli, file, PathBuf::from("/default"));

        assert_eq!(config.journal, "From CLI");
        assert_eq!(config.tags, ["cli"]);
        assert_eq!(config.data_dir, PathBuf::from("/file-dir"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let parsed: Result<FileConfig, _> = serde_yaml::from_str("feed: http://x\n");
        assert!(parsed.is_err());
    }

    #[test]
    fn test_load_reads_implicit_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.yaml"), "journal: Blog\n").unwrap();
        let data_dir = dir.path().to_str().unwrap();

        let cli = Cli::parse_from(["feed_journal", "--data-dir", data_dir]);
        let config = load(&cli).unwrap();

        assert_eq!(config.journal, "Blog");
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_load_missing_explicit_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        let cli = Cli::parse_from([
            "feed_journal",
            "--data-dir",
            dir.path().to_str().unwrap(),
            "--config",
            missing.to_str().unwrap(),
        ]);

        assert!(load(&cli).is_err());
    }

    #[test]
    fn test_empty_config_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "\n").unwrap();

        let file = read_file_config(&path).unwrap();
        assert!(file.feed_url.is_none());
    }
}
