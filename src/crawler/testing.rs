//! In-memory fetch client for unit tests

use crate::fetch::{FetchClient, FetchError, FetchOptions, FetchResult};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

struct CannedResponse {
    status: u16,
    content_type: &'static str,
    body: String,
}

/// Serves canned responses and counts requests per URL
///
/// Unknown URLs answer 404.
#[derive(Default)]
pub struct StaticFetchClient {
    responses: HashMap<String, CannedResponse>,
    failures: HashMap<String, FetchError>,
    hits: Mutex<HashMap<String, usize>>,
}

impl StaticFetchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: &str) -> Self {
        self.raw(url, "text/html; charset=utf-8", html)
    }

    pub fn raw(mut self, url: &str, content_type: &'static str, body: &str) -> Self {
        self.responses.insert(
            url.to_string(),
            CannedResponse {
                status: 200,
                content_type,
                body: body.to_string(),
            },
        );
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(
            url.to_string(),
            CannedResponse {
                status,
                content_type: "text/html",
                body: String::new(),
            },
        );
        self
    }

    pub fn failure(mut self, url: &str, error: FetchError) -> Self {
        self.failures.insert(url.to_string(), error);
        self
    }

    pub fn hits(&self, url: &str) -> usize {
        self.hits.lock().unwrap().get(url).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.hits.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl FetchClient for StaticFetchClient {
    async fn fetch(&self, url: &str, _options: &FetchOptions) -> Result<FetchResult, FetchError> {
        *self.hits.lock().unwrap().entry(url.to_string()).or_default() += 1;

        if let Some(error) = self.failures.get(url) {
            return Err(error.clone());
        }

        let (status, content_type, body) = match self.responses.get(url) {
            Some(canned) => (canned.status, canned.content_type, canned.body.clone()),
            None => (404, "text/html", String::new()),
        };

        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), content_type.to_string());

        Ok(FetchResult {
            url: url.to_string(),
            final_url: url.to_string(),
            status_code: status,
            headers,
            body: body.into_bytes(),
        })
    }
}
