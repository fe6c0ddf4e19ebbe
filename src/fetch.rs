//! HTTP access for the feed document and embedded images.
//!
//! The pipeline only ever needs "GET this URL, give me the bytes", so that is
//! the whole [`FeedSource`] contract. [`HttpClient`] is the `reqwest`-backed
//! implementation; tests substitute an in-memory fake.

use crate::error::PipelineError;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Capability to retrieve a resource by URL.
pub trait FeedSource {
    /// Fetch `url` and return the response body.
    ///
    /// Non-success statuses are errors. No retry is attempted.
    async fn get(&self, url: &str) -> Result<Vec<u8>, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl FeedSource for HttpClient {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn get(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let t0 = Instant::now();
        let wrap = |source: reqwest::Error| PipelineError::network(url, source);

        let res = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status());
        let res = match res {
            Ok(res) => res,
            Err(e) => {
                warn!(error = %e, "GET failed");
                return Err(wrap(e));
            }
        };
        let body = res.bytes().await.map_err(wrap)?;

        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "GET complete"
        );
        Ok(body.to_vec())
    }
}
