//! Request and response types for the tool API

use crate::crawler::{BatchReport, CrawlReport, ScrapedPage};
use crate::store::FileInfo;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Maximum number of URLs accepted by one `scrape_batch` call
pub const MAX_BATCH_URLS: usize = 10;

/// Request for `scrape_page`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScrapePageRequest {
    /// The http(s) URL to scrape
    pub url: String,

    /// Also return the sanitized HTML
    #[serde(default)]
    pub include_html: bool,

    /// CSS selector whose matches are returned as elements
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    /// Save the Markdown below the output directory
    #[serde(default)]
    pub save_markdown: bool,

    /// File name for the saved Markdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Response data for `scrape_page`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapePageResponse {
    pub page: ScrapedPage,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<String>,
}

/// Request for `scrape_batch`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeBatchRequest {
    /// URLs to scrape (1-10)
    pub urls: Vec<String>,

    /// URLs fetched concurrently per chunk (1-15)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_concurrent: Option<usize>,

    /// Also return the sanitized HTML of each page
    #[serde(default)]
    pub include_html: bool,

    /// CSS selector applied to every page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

/// Response data for `scrape_batch`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeBatchResponse {
    #[serde(flatten)]
    pub report: BatchReport,
}

/// Request for `crawl_site`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CrawlSiteRequest {
    /// Seed URL
    pub url: String,

    /// Maximum link distance from the seed (1-5)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<u32>,

    /// Maximum number of pages (1-200)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<usize>,

    /// Keep links to other hosts in page records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_external: Option<bool>,

    /// Wildcard pattern internal links must match to be followed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_filter: Option<String>,

    /// Save the page inventory as a JSON artifact
    #[serde(default)]
    pub save_artifact: bool,
}

/// Response data for `crawl_site`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrawlSiteResponse {
    #[serde(flatten)]
    pub report: CrawlReport,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<String>,
}

/// Request for `sanitize_html`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SanitizeHtmlRequest {
    /// HTML to clean
    pub html: String,
}

/// Response data for `sanitize_html`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SanitizeHtmlResponse {
    pub html: String,
}

/// Request for `html_to_markdown`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct HtmlToMarkdownRequest {
    /// HTML to convert; it is sanitized first
    pub html: String,

    /// Save the Markdown below the output directory
    #[serde(default)]
    pub save_markdown: bool,

    /// File name for the saved Markdown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

/// Response data for `html_to_markdown`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct HtmlToMarkdownResponse {
    pub markdown: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_path: Option<String>,
}

/// Request for `list_files`
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListFilesRequest {
    /// Directory relative to the output directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Wildcard pattern file names must match; `*` is the only wildcard
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// Response data for `list_files`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    pub files: Vec<FileInfo>,
}

/// Outcome discriminator of every tool response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    Error,
}

/// Envelope around every tool response
///
/// Successful responses carry the operation's fields inline next to
/// `status`; failures carry only `status` and `errorMessage`. Response
/// fields are camelCase throughout, like the reports they wrap.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ToolOutput<T> {
    pub status: ToolStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ToolOutput<T> {
    /// Wraps successful response data
    pub fn success(data: T) -> Self {
        Self {
            status: ToolStatus::Success,
            error_message: None,
            data: Some(data),
        }
    }

    /// Builds a failure response
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            error_message: Some(message.into()),
            data: None,
        }
    }

    /// Returns true for successful responses
    pub fn is_success(&self) -> bool {
        self.status == ToolStatus::Success
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for ToolOutput<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::error(e.to_string()),
        }
    }
}
