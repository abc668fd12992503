//! reqwest-backed fetch client
//!
//! This module handles all HTTP requests, including:
//! - Building HTTP clients with the configured user agent
//! - GET requests with a hard per-request timeout
//! - Redirect following (max 10 hops)
//! - Error classification into timeouts and transport failures

use crate::fetch::{ClientPool, FetchClient, FetchError, FetchOptions, FetchResult};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{redirect::Policy, Client};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// User agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = concat!("page-trawl/", env!("CARGO_PKG_VERSION"));

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use page_trawl::fetch::build_http_client;
///
/// let client = build_http_client("page-trawl/0.1").unwrap();
/// ```
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages over HTTP using a shared [`ClientPool`]
#[derive(Debug, Clone)]
pub struct HttpFetchClient {
    pool: Arc<ClientPool>,
}

impl HttpFetchClient {
    /// Creates a fetch client backed by the given pool
    pub fn new(pool: Arc<ClientPool>) -> Self {
        Self { pool }
    }

    /// Creates a fetch client with its own pool
    pub fn with_user_agent(user_agent: impl Into<String>) -> Self {
        Self::new(Arc::new(ClientPool::new(user_agent)))
    }

    /// The pool this client draws from
    pub fn pool(&self) -> &Arc<ClientPool> {
        &self.pool
    }

    async fn send(&self, client: Client, url: Url) -> Result<FetchResult, reqwest::Error> {
        let requested = url.to_string();
        let response = client.get(url).send().await?;

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(FetchResult {
            url: requested,
            final_url,
            status_code,
            headers,
            body,
        })
    }
}

#[async_trait]
impl FetchClient for HttpFetchClient {
    async fn fetch(&self, url: &str, options: &FetchOptions) -> Result<FetchResult, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl(format!(
                "{}: only http and https are supported",
                url
            )));
        }

        let client = self.pool.client().await?;
        tracing::debug!("GET {} (wait: {:?})", url, options.wait_strategy);

        match tokio::time::timeout(options.timeout, self.send(client, parsed)).await {
            Ok(Ok(result)) => {
                tracing::debug!("{} -> {} ({} bytes)", url, result.status_code, result.body.len());
                Ok(result)
            }
            Ok(Err(e)) => {
                if e.is_connect() {
                    // A refused or reset connection may have poisoned pooled sockets
                    self.pool.invalidate().await;
                }
                Err(FetchError::from_reqwest(url, e, options.timeout))
            }
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                timeout_ms: options.timeout.as_millis() as u64,
            }),
        }
    }
}

/// Copies response headers into a map with lowercase names
fn collect_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_ascii_lowercase(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client("TestCrawler/1.0");
        assert!(client.is_ok());
    }

    #[test]
    fn test_default_user_agent() {
        assert!(DEFAULT_USER_AGENT.starts_with("page-trawl/"));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let client = HttpFetchClient::with_user_agent("TestCrawler/1.0");
        let err = client
            .fetch("ftp://example.com/file", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
        // Validation happens before any client is built
        assert_eq!(client.pool().generation(), 0);
    }

    #[tokio::test]
    async fn test_rejects_unparseable_url() {
        let client = HttpFetchClient::with_user_agent("TestCrawler/1.0");
        let err = client
            .fetch("not a url", &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
