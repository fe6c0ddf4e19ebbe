//! Atom feed decoding.
//!
//! The feed is deserialized with `quick-xml`'s serde support; only the
//! `title`, `published` and `content` children of each `entry` are read.
//! Escaped and CDATA-wrapped HTML bodies both come out as plain text.
//!
//! The serde decoder matches element names without namespaces, so an
//! `<entry>` that redeclares a non-Atom default namespace is skipped here.
//! Prefixed foreign elements are not detected. Inline `type="xhtml"` text
//! constructs are rejected rather than decoded to an empty string.

use crate::error::PipelineError;
use crate::models::{Entry, Timestamp};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// First `src="...jpg"` / `src="...jpeg"` attribute in a body.
static JPEG_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"src="([^"]+\.jpe?g)""#).unwrap());

#[derive(Debug, Deserialize)]
struct AtomFeed {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

#[derive(Debug, Deserialize)]
struct AtomEntry {
    #[serde(rename = "@xmlns")]
    xmlns: Option<String>,
    title: Option<AtomText>,
    published: Option<String>,
    content: Option<AtomText>,
}

/// Text construct (`<title>`, `<content>`).
#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "@type")]
    kind: Option<String>,
    #[serde(rename = "$text", default)]
    value: String,
}

impl AtomText {
    fn into_text(self, index: usize, field: &str) -> Result<String, PipelineError> {
        if self.kind.as_deref() == Some("xhtml") {
            return Err(PipelineError::malformed(
                "entry",
                format!("entry #{index} has unsupported xhtml <{field}>"),
            ));
        }
        Ok(self.value)
    }
}

/// Decode an Atom document into entries, in document order.
///
/// Any entry missing `title`, `published` or `content`, or carrying an
/// unparseable `published` value, fails the whole document.
#[instrument(level = "info", skip_all, fields(bytes = bytes.len()))]
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<Entry>, PipelineError> {
    let xml = std::str::from_utf8(bytes)
        .map_err(|e| PipelineError::malformed("feed", format!("not UTF-8: {e}")))?;
    let feed: AtomFeed = quick_xml::de::from_str(xml)
        .map_err(|e| PipelineError::malformed("feed", e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .enumerate()
        .map(|(i, raw)| into_entry(i, raw))
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .flatten()
        .collect::<Vec<_>>();

    info!(count = entries.len(), "Parsed feed entries");
    Ok(entries)
}

/// `Ok(None)` for entries outside the Atom namespace.
fn into_entry(index: usize, raw: AtomEntry) -> Result<Option<Entry>, PipelineError> {
    if let Some(ns) = raw.xmlns.as_deref().filter(|ns| *ns != ATOM_NS) {
        debug!(index, ns, "Skipping entry in foreign namespace");
        return Ok(None);
    }

    let missing =
        |field: &str| PipelineError::malformed("entry", format!("entry #{index} has no <{field}>"));

    let title = raw
        .title
        .ok_or_else(|| missing("title"))?
        .into_text(index, "title")?;
    let published = raw.published.ok_or_else(|| missing("published"))?;
    let html_body = raw
        .content
        .ok_or_else(|| missing("content"))?
        .into_text(index, "content")?;

    let published = published.trim().to_string();
    let published_at = published.parse::<Timestamp>()?;
    let image_url = extract_image_url(&html_body);
    debug!(index, %title, %published, has_image = image_url.is_some(), "Decoded entry");

    Ok(Some(Entry {
        title,
        published,
        published_at,
        html_body,
        image_url,
    }))
}

/// Return the first JPEG `src` in `html`, in document order.
///
/// PNG, GIF, WebP and other formats are never returned.
pub fn extract_image_url(html: &str) -> Option<String> {
    JPEG_SRC
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
