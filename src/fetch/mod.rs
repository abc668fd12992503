//! Fetch transport for page-trawl
//!
//! This module defines the boundary between the scrapers and the network:
//! - [`FetchClient`], the trait every transport implements
//! - [`HttpFetchClient`], the reqwest implementation
//! - [`ClientPool`], the shared, lazily created HTTP client

mod client;
mod pool;

pub use client::{build_http_client, HttpFetchClient, DEFAULT_USER_AGENT};
pub use pool::ClientPool;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Transport-level failures
///
/// HTTP status errors are not transport failures; a response with any status
/// code is a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("Request to {url} timed out after {timeout_ms} ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl FetchError {
    /// Classifies a reqwest error for the given URL
    pub fn from_reqwest(url: &str, err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }
        } else {
            FetchError::Transport {
                url: url.to_string(),
                message: err.to_string(),
            }
        }
    }

    /// Returns true for timeouts
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Page lifecycle event a transport should wait for before returning
///
/// Plain HTTP transports return once the body is read; the value is carried
/// for transports that render pages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum WaitStrategy {
    #[default]
    Load,
    DomContentLoaded,
    NetworkIdle,
}

/// Per-request options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub wait_strategy: WaitStrategy,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            wait_strategy: WaitStrategy::default(),
        }
    }
}

/// Raw response produced by a [`FetchClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// URL that was requested
    pub url: String,
    /// URL after redirects
    pub final_url: String,
    pub status_code: u16,
    /// Response headers with lowercase names
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl FetchResult {
    /// Content-Type header value, if present
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Returns true if the response looks like an HTML document
    ///
    /// Uses the Content-Type header when present and sniffs the body
    /// otherwise.
    pub fn is_html(&self) -> bool {
        if let Some(content_type) = self.content_type() {
            let lower = content_type.to_ascii_lowercase();
            return lower.contains("text/html") || lower.contains("application/xhtml");
        }

        let text = self.body_text();
        let start = text.trim_start().to_ascii_lowercase();
        start.starts_with("<!doctype html") || start.starts_with("<html")
    }

    /// Body decoded as UTF-8, replacing invalid sequences
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// A transport capable of fetching a URL
#[async_trait]
pub trait FetchClient: Send + Sync {
    /// Fetches a URL, returning the response whatever its status code
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError>;
}
