//! Tool API for agent callers
//!
//! This module handles:
//! - Typed request and response objects with JSON schemas
//! - One async method per operation on [`Toolkit`]
//! - Dispatch of JSON requests by operation name
//! - Optional saving of results through the guarded content store
//!
//! Every response is wrapped in a [`ToolOutput`] whose `status` is either
//! `"success"` or `"error"`; no operation lets an error escape as a panic or
//! a transport-level failure.

mod types;

pub use types::{
    CrawlSiteRequest, CrawlSiteResponse, HtmlToMarkdownRequest, HtmlToMarkdownResponse,
    ListFilesRequest, ListFilesResponse, SanitizeHtmlRequest, SanitizeHtmlResponse,
    ScrapeBatchRequest, ScrapeBatchResponse, ScrapePageRequest, ScrapePageResponse, ToolOutput,
    ToolStatus, MAX_BATCH_URLS,
};

use crate::config::{BatchConfig, Config, CrawlerConfig};
use crate::crawler::{BatchScraper, CrawlOptions, PageScraper, ScrapeOptions, SiteCrawler};
use crate::html::HtmlSanitizer;
use crate::markdown::MarkdownConverter;
use crate::output::{save_crawl_artifact, save_markdown};
use crate::progress::ProgressReporter;
use crate::store::{ContentStore, StoreResult};
use crate::ScrapeError;
use chrono::Utc;
use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Names of every operation [`Toolkit::dispatch`] accepts
pub const OPERATIONS: &[&str] = &[
    "scrape_page",
    "scrape_batch",
    "crawl_site",
    "sanitize_html",
    "html_to_markdown",
    "list_files",
];

/// The scraping operations exposed to tool callers
#[derive(Debug, Clone)]
pub struct Toolkit {
    scraper: Arc<PageScraper>,
    batch: BatchScraper,
    crawler: SiteCrawler,
    store: ContentStore,
    sanitizer: HtmlSanitizer,
    converter: MarkdownConverter,
    crawler_config: CrawlerConfig,
    batch_config: BatchConfig,
}

impl Toolkit {
    /// Builds a toolkit that fetches over HTTP as configured
    pub fn from_config(config: &Config) -> Self {
        Self::with_scraper(Arc::new(PageScraper::from_config(config)), config)
    }

    /// Builds a toolkit around an existing page scraper
    pub fn with_scraper(scraper: Arc<PageScraper>, config: &Config) -> Self {
        let batch = BatchScraper::new(Arc::clone(&scraper))
            .with_chunk_delay(Duration::from_millis(config.batch.chunk_delay_ms));

        Self {
            crawler: SiteCrawler::new(Arc::clone(&scraper)),
            batch,
            scraper,
            store: ContentStore::new(config.output.root_dir.clone()),
            sanitizer: HtmlSanitizer::new(),
            converter: MarkdownConverter::new(),
            crawler_config: config.crawler.clone(),
            batch_config: config.batch.clone(),
        }
    }

    /// The store that saved artifacts go to
    pub fn store(&self) -> &ContentStore {
        &self.store
    }

    /// Scrapes one page, optionally saving its Markdown
    pub async fn scrape_page(
        &self,
        request: ScrapePageRequest,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ScrapePageResponse, ScrapeError> {
        let options = ScrapeOptions {
            include_html: request.include_html,
            selector: request.selector,
        };

        progress.in_progress("fetch", format!("Fetching {}", request.url));
        let page = self.scraper.scrape(&request.url, &options, cancel).await?;

        let saved_path = if request.save_markdown {
            saved(
                save_markdown(&self.store, request.filename.as_deref(), &page.markdown, Utc::now()).await,
                "markdown",
            )
        } else {
            None
        };

        progress.done("scrape", format!("Scraped {}", page.final_url));
        Ok(ScrapePageResponse { page, saved_path })
    }

    /// Scrapes up to [`MAX_BATCH_URLS`] pages with bounded concurrency
    pub async fn scrape_batch(
        &self,
        request: ScrapeBatchRequest,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<ScrapeBatchResponse, ScrapeError> {
        if request.urls.is_empty() || request.urls.len() > MAX_BATCH_URLS {
            return Err(ScrapeError::InvalidArgument(format!(
                "urls must contain between 1 and {} entries, got {}",
                MAX_BATCH_URLS,
                request.urls.len()
            )));
        }

        let options = ScrapeOptions {
            include_html: request.include_html,
            selector: request.selector,
        };
        let max_concurrent = request
            .max_concurrent
            .unwrap_or(self.batch_config.max_concurrent);

        let report = self
            .batch
            .scrape_batch(&request.urls, max_concurrent, &options, progress, cancel)
            .await?;
        Ok(ScrapeBatchResponse { report })
    }

    /// Crawls a site, optionally saving the page inventory
    pub async fn crawl_site(
        &self,
        request: CrawlSiteRequest,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<CrawlSiteResponse, ScrapeError> {
        let options = CrawlOptions {
            max_depth: request.max_depth.unwrap_or(self.crawler_config.max_depth),
            max_pages: request.max_pages.unwrap_or(self.crawler_config.max_pages),
            include_external: request
                .include_external
                .unwrap_or(self.crawler_config.include_external),
            link_filter: request.link_filter,
            link_delay: Duration::from_millis(self.crawler_config.link_delay_ms),
        };

        let report = self
            .crawler
            .crawl(&request.url, &options, progress, cancel)
            .await?;

        let saved_path = if request.save_artifact {
            saved(
                save_crawl_artifact(&self.store, &report, Utc::now()).await,
                "crawl artifact",
            )
        } else {
            None
        };

        Ok(CrawlSiteResponse { report, saved_path })
    }

    /// Strips executable content from HTML
    pub fn sanitize_html(&self, request: SanitizeHtmlRequest) -> SanitizeHtmlResponse {
        SanitizeHtmlResponse {
            html: self.sanitizer.sanitize(&request.html),
        }
    }

    /// Sanitizes HTML and converts it to Markdown, optionally saving it
    pub async fn html_to_markdown(&self, request: HtmlToMarkdownRequest) -> HtmlToMarkdownResponse {
        let clean = self.sanitizer.sanitize(&request.html);
        let markdown = self.converter.convert(&clean);

        let saved_path = if request.save_markdown {
            saved(
                save_markdown(&self.store, request.filename.as_deref(), &markdown, Utc::now()).await,
                "markdown",
            )
        } else {
            None
        };

        HtmlToMarkdownResponse {
            markdown,
            saved_path,
        }
    }

    /// Lists saved files below the output directory
    pub async fn list_files(&self, request: ListFilesRequest) -> Result<ListFilesResponse, ScrapeError> {
        let files = self
            .store
            .list(request.directory.as_deref(), request.pattern.as_deref())
            .await?;
        Ok(ListFilesResponse { files })
    }

    /// Runs the operation named `operation` on a JSON request
    ///
    /// # Arguments
    ///
    /// * `operation` - One of [`OPERATIONS`]
    /// * `input` - The request object for that operation
    /// * `progress` - Receives progress events from long-running operations
    /// * `cancel` - Aborts the operation at its next suspension point
    ///
    /// # Returns
    ///
    /// A JSON response with `status` set to `"success"` or `"error"`. Unknown
    /// operations and malformed requests produce error responses.
    pub async fn dispatch(
        &self,
        operation: &str,
        input: Value,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Value {
        tracing::debug!("Dispatching tool operation {}", operation);

        match operation {
            "scrape_page" => encode(match decode(input) {
                Ok(request) => self.scrape_page(request, progress, cancel).await,
                Err(e) => Err(e),
            }),
            "scrape_batch" => encode(match decode(input) {
                Ok(request) => self.scrape_batch(request, progress, cancel).await,
                Err(e) => Err(e),
            }),
            "crawl_site" => encode(match decode(input) {
                Ok(request) => self.crawl_site(request, progress, cancel).await,
                Err(e) => Err(e),
            }),
            "sanitize_html" => encode(decode(input).map(|request| self.sanitize_html(request))),
            "html_to_markdown" => encode(match decode(input) {
                Ok(request) => Ok(self.html_to_markdown(request).await),
                Err(e) => Err(e),
            }),
            "list_files" => encode(match decode(input) {
                Ok(request) => self.list_files(request).await,
                Err(e) => Err(e),
            }),
            other => encode::<Value>(Err(ScrapeError::UnknownOperation(other.to_string()))),
        }
    }
}

/// JSON schema of the request object for `operation`
pub fn input_schema(operation: &str) -> Result<Value, ScrapeError> {
    let schema = match operation {
        "scrape_page" => schema_for!(ScrapePageRequest),
        "scrape_batch" => schema_for!(ScrapeBatchRequest),
        "crawl_site" => schema_for!(CrawlSiteRequest),
        "sanitize_html" => schema_for!(SanitizeHtmlRequest),
        "html_to_markdown" => schema_for!(HtmlToMarkdownRequest),
        "list_files" => schema_for!(ListFilesRequest),
        other => return Err(ScrapeError::UnknownOperation(other.to_string())),
    };
    Ok(serde_json::to_value(schema).unwrap_or_default())
}

/// JSON schema of the success data for `operation`
pub fn output_schema(operation: &str) -> Result<Value, ScrapeError> {
    let schema = match operation {
        "scrape_page" => schema_for!(ScrapePageResponse),
        "scrape_batch" => schema_for!(ScrapeBatchResponse),
        "crawl_site" => schema_for!(CrawlSiteResponse),
        "sanitize_html" => schema_for!(SanitizeHtmlResponse),
        "html_to_markdown" => schema_for!(HtmlToMarkdownResponse),
        "list_files" => schema_for!(ListFilesResponse),
        other => return Err(ScrapeError::UnknownOperation(other.to_string())),
    };
    Ok(serde_json::to_value(schema).unwrap_or_default())
}

fn decode<T: DeserializeOwned>(input: Value) -> Result<T, ScrapeError> {
    serde_json::from_value(input)
        .map_err(|e| ScrapeError::InvalidArgument(format!("invalid request: {}", e)))
}

fn encode<T: Serialize>(result: Result<T, ScrapeError>) -> Value {
    if let Err(e) = &result {
        tracing::warn!("Tool operation failed: {}", e);
    }

    let output = ToolOutput::from(result);
    serde_json::to_value(&output).unwrap_or_else(|e| {
        serde_json::json!({
            "status": "error",
            "errorMessage": format!("failed to encode response: {}", e),
        })
    })
}

/// Keeps a failed optional save from failing the whole operation
fn saved(result: StoreResult<PathBuf>, what: &str) -> Option<String> {
    match result {
        Ok(path) => Some(path.display().to_string()),
        Err(e) => {
            tracing::warn!("Failed to save {}: {}", what, e);
            None
        }
    }
}
