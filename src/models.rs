//! Data models shared across the pipeline.
//!
//! - [`Timestamp`]: an ISO-8601 instant as found in feeds and in the marker file
//! - [`Entry`]: one post decoded from the Atom feed
//! - [`JournalEntry`]: the request handed to the journaling tool

use crate::error::PipelineError;
use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat};
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// An ISO-8601 timestamp.
///
/// Values with an explicit offset (`2024-01-03T09:00:00+02:00`, `...Z`) keep
/// it; naive values (`2024-01-03T09:00:00`) are treated as UTC for ordering
/// but are written back without an offset, so a marker round-trips unchanged.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    instant: DateTime<FixedOffset>,
    naive: bool,
}

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

impl Timestamp {
    pub fn instant(&self) -> DateTime<FixedOffset> {
        self.instant
    }
}

impl FromStr for Timestamp {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(instant) = DateTime::parse_from_rfc3339(s) {
            return Ok(Timestamp {
                instant,
                naive: false,
            });
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
                return Ok(Timestamp {
                    instant: naive.and_utc().fixed_offset(),
                    naive: true,
                });
            }
        }
        Err(PipelineError::malformed(
            "timestamp",
            format!("{s:?} is not an ISO-8601 date-time"),
        ))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.naive {
            write!(
                f,
                "{}",
                self.instant.naive_local().format("%Y-%m-%dT%H:%M:%S%.f")
            )
        } else {
            f.write_str(&self.instant.to_rfc3339_opts(SecondsFormat::AutoSi, false))
        }
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.instant.cmp(&other.instant)
    }
}

/// One post decoded from the feed. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct Entry {
    pub title: String,
    /// Published time exactly as it appeared in the feed.
    pub published: String,
    pub published_at: Timestamp,
    pub html_body: String,
    /// First JPEG referenced by the body, if any.
    pub image_url: Option<String>,
}

impl Entry {
    /// Calendar-date part of the published time (text before the `T`).
    pub fn published_date(&self) -> &str {
        self.published
            .split('T')
            .next()
            .unwrap_or(self.published.as_str())
    }
}

/// Everything the journaling tool needs to create one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub date: String,
    pub content: String,
    pub journal: String,
    pub tags: Vec<String>,
    pub attachments: Vec<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_naive_timestamp_round_trips() {
        let t = ts("2024-01-03T09:00:00");
        assert_eq!(t.to_string(), "2024-01-03T09:00:00");
        assert_eq!(ts(&t.to_string()), t);
    }

    #[test]
    fn test_offset_timestamp_round_trips() {
        let t = ts("2024-01-03T09:00:00+02:00");
        assert_eq!(t.to_string(), "2024-01-03T09:00:00+02:00");

        let z = ts("2024-01-03T09:00:00Z");
        assert_eq!(z.to_string(), "2024-01-03T09:00:00+00:00");
        assert_eq!(ts(&z.to_string()), z);
    }

    #[test]
    fn test_fractional_seconds_kept() {
        let t = ts("2024-01-03T09:00:00.250");
        assert_eq!(t.to_string(), "2024-01-03T09:00:00.250");
    }

    #[test]
    fn test_ordering_across_offsets() {
        assert!(ts("2024-01-03T09:00:00") > ts("2024-01-01T10:00:00"));
        // 10:00+02:00 is 08:00 UTC
        assert!(ts("2024-01-03T10:00:00+02:00") < ts("2024-01-03T09:00:00Z"));
        assert_eq!(ts("2024-01-03T09:00:00Z"), ts("2024-01-03T09:00:00"));
    }

    #[test]
    fn test_rejects_garbage() {
        let err = "yesterday".parse::<Timestamp>().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Malformed);
        assert!("2024-01-03".parse::<Timestamp>().is_err());
    }

    #[test]
    fn test_published_date() {
        let entry = Entry {
            title: "Hello".to_string(),
            published: "2024-01-03T09:00:00+00:00".to_string(),
            published_at: ts("2024-01-03T09:00:00+00:00"),
            html_body: String::new(),
            image_url: None,
        };
        assert_eq!(entry.published_date(), "2024-01-03");
    }
}
