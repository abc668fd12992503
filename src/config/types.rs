use crate::fetch::{FetchOptions, WaitStrategy, DEFAULT_USER_AGENT};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for page-trawl
///
/// Every section is optional; a missing section or key takes its default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetch: FetchConfig,
    pub crawler: CrawlerConfig,
    pub batch: BatchConfig,
    pub output: OutputConfig,
}

/// Transport configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout (milliseconds)
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Page lifecycle event to wait for
    #[serde(rename = "wait-strategy")]
    pub wait_strategy: WaitStrategy,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            wait_strategy: WaitStrategy::default(),
        }
    }
}

impl FetchConfig {
    /// Per-request options derived from this section
    pub fn fetch_options(&self) -> FetchOptions {
        FetchOptions {
            timeout: Duration::from_millis(self.timeout_ms),
            wait_strategy: self.wait_strategy,
        }
    }
}

/// Site crawler configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Maximum link distance from the seed URL
    #[serde(rename = "max-depth")]
    pub max_depth: u32,

    /// Maximum number of pages recorded per crawl
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Pause between page fetches (milliseconds)
    #[serde(rename = "link-delay-ms")]
    pub link_delay_ms: u64,

    /// Whether external links are kept in page records
    #[serde(rename = "include-external")]
    pub include_external: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 50,
            link_delay_ms: 200,
            include_external: false,
        }
    }
}

/// Batch scraper configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of URLs fetched concurrently per chunk
    #[serde(rename = "max-concurrent")]
    pub max_concurrent: usize,

    /// Pause between chunks (milliseconds)
    #[serde(rename = "chunk-delay-ms")]
    pub chunk_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 5,
            chunk_delay_ms: 1_000,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory that every saved artifact must stay inside
    #[serde(rename = "root-dir")]
    pub root_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("./output"),
        }
    }
}
