//! Single-page scraping
//!
//! A scrape is one fetch followed by sanitization, Markdown conversion, link
//! extraction and optional selector extraction. Raw markup never leaves this
//! module: everything returned is derived from the sanitized document.

use crate::config::Config;
use crate::crawler::extract::{extract_elements, extract_links, ExtractedElement};
use crate::fetch::{ClientPool, FetchClient, FetchOptions, FetchResult, HttpFetchClient};
use crate::html::{strip_dangerous, HtmlSanitizer};
use crate::markdown::{escape_text, plain_text, MarkdownConverter};
use crate::ScrapeError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What to extract besides Markdown
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapeOptions {
    /// Return the sanitized HTML alongside the Markdown
    pub include_html: bool,
    /// CSS selector whose matches are returned as [`ExtractedElement`]s
    pub selector: Option<String>,
}

/// The processed content of one page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapedPage {
    pub url: String,
    pub final_url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub title: Option<String>,
    /// Markdown for HTML pages and markup-like bodies, the escaped body for
    /// anything else
    pub markdown: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    /// Absolute links found in the sanitized document, in document order
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub elements: Vec<ExtractedElement>,
}

/// Fetches pages and turns them into sanitized Markdown
pub struct PageScraper {
    client: Arc<dyn FetchClient>,
    fetch_options: FetchOptions,
    sanitizer: HtmlSanitizer,
    converter: MarkdownConverter,
}

impl std::fmt::Debug for PageScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageScraper")
            .field("fetch_options", &self.fetch_options)
            .finish_non_exhaustive()
    }
}

impl PageScraper {
    /// Creates a scraper over any fetch transport
    pub fn new(client: Arc<dyn FetchClient>, fetch_options: FetchOptions) -> Self {
        Self {
            client,
            fetch_options,
            sanitizer: HtmlSanitizer::new(),
            converter: MarkdownConverter::new(),
        }
    }

    /// Creates a scraper over HTTP using a shared client pool
    pub fn with_pool(pool: Arc<ClientPool>, fetch_options: FetchOptions) -> Self {
        Self::new(Arc::new(HttpFetchClient::new(pool)), fetch_options)
    }

    /// Creates an HTTP scraper from the `[fetch]` configuration section
    pub fn from_config(config: &Config) -> Self {
        let pool = Arc::new(ClientPool::new(config.fetch.user_agent.clone()));
        Self::with_pool(pool, config.fetch.fetch_options())
    }

    /// Options applied to every fetch
    pub fn fetch_options(&self) -> &FetchOptions {
        &self.fetch_options
    }

    /// Fetches and processes one page
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapedPage)` - The page was fetched with a status below 400
    /// * `Err(ScrapeError::InvalidUrl)` - `url` is not an absolute http(s) URL
    /// * `Err(ScrapeError::Fetch)` - Transport failure or timeout
    /// * `Err(ScrapeError::Http)` - The server answered with status 400 or above
    /// * `Err(ScrapeError::Cancelled)` - `cancel` fired before the fetch completed
    pub async fn scrape(
        &self,
        url: &str,
        options: &ScrapeOptions,
        cancel: &CancellationToken,
    ) -> Result<ScrapedPage, ScrapeError> {
        let fetched = self.fetch(url, cancel).await?;
        self.process(fetched, options)
    }

    /// Fetches a page, failing on transport errors and error statuses
    pub async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<FetchResult, ScrapeError> {
        let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ScrapeError::InvalidUrl(format!(
                "{}: only http and https are supported",
                url
            )));
        }

        if cancel.is_cancelled() {
            return Err(ScrapeError::Cancelled);
        }

        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScrapeError::Cancelled),
            result = self.client.fetch(parsed.as_str(), &self.fetch_options) => result?,
        };

        if fetched.status_code >= 400 {
            return Err(ScrapeError::Http {
                url: url.to_string(),
                status: fetched.status_code,
            });
        }

        Ok(fetched)
    }

    /// Turns a fetched response into a [`ScrapedPage`]
    pub fn process(&self, fetched: FetchResult, options: &ScrapeOptions) -> Result<ScrapedPage, ScrapeError> {
        let content_type = fetched.content_type().map(str::to_string);
        let body = fetched.body_text();

        if !fetched.is_html() && !looks_like_markup(&body) {
            tracing::debug!(
                "{} is not HTML ({}), returning body as escaped text",
                fetched.url,
                content_type.as_deref().unwrap_or("no content type")
            );
            return Ok(ScrapedPage {
                url: fetched.url,
                final_url: fetched.final_url,
                status_code: fetched.status_code,
                content_type,
                title: None,
                markdown: escape_text(&body),
                html: None,
                links: Vec::new(),
                elements: Vec::new(),
            });
        }

        let (title, clean, markdown) = match self.sanitizer.sanitize_document(&body) {
            Ok(document) => {
                let clean = document.body_html();
                let markdown = self.converter.convert_document(&document).unwrap_or_else(|e| {
                    tracing::warn!("Markdown conversion of {} failed ({}), using plain text", fetched.url, e);
                    plain_text(&clean)
                });
                (document.title, clean, markdown)
            }
            Err(e) => {
                tracing::warn!("Sanitizing {} fell back to string stripping: {}", fetched.url, e);
                let clean = strip_dangerous(&body);
                let markdown = plain_text(&clean);
                (None, clean, markdown)
            }
        };

        let base = Url::parse(&fetched.final_url)
            .or_else(|_| Url::parse(&fetched.url))
            .map_err(|e| ScrapeError::InvalidUrl(format!("{}: {}", fetched.final_url, e)))?;
        let links = extract_links(&clean, &base)
            .into_iter()
            .map(|link| link.to_string())
            .collect();

        let elements = match options.selector.as_deref() {
            Some(selector) => extract_elements(&clean, selector)?,
            None => Vec::new(),
        };

        tracing::debug!("Scraped {} ({} chars of markdown)", fetched.final_url, markdown.len());

        Ok(ScrapedPage {
            url: fetched.url,
            final_url: fetched.final_url,
            status_code: fetched.status_code,
            content_type,
            title,
            markdown,
            html: options.include_html.then_some(clean),
            links,
            elements,
        })
    }
}

/// Returns true when a body starts like a tag, whatever its content type says
fn looks_like_markup(body: &str) -> bool {
    body.trim_start()
        .strip_prefix('<')
        .and_then(|rest| rest.chars().next())
        .map_or(false, |c| c.is_ascii_alphabetic() || c == '!' || c == '?')
}
