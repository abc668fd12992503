//! page-trawl: HTML extraction and site inventory for agent tools
//!
//! This crate fetches web pages, strips executable markup from them, converts
//! what remains to Markdown, and walks a site's internal link graph. Every
//! string that arrives from a tool caller (wildcard filters, file names, output
//! paths) goes through the injection-safe matcher or the path guard before it
//! touches the filesystem.

pub mod config;
pub mod crawler;
pub mod fetch;
pub mod html;
pub mod markdown;
pub mod output;
pub mod progress;
pub mod store;
pub mod tools;
pub mod url;

use thiserror::Error;

pub use fetch::FetchError;
pub use store::{PathError, StoreError};

/// Main error type for page-trawl operations
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("HTTP error {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Path error: {0}")]
    Path(#[from] PathError),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScrapeError {
    /// Returns true if this error came from a cancellation signal
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// HTTP status attached to this error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

impl From<UrlError> for ScrapeError {
    fn from(err: UrlError) -> Self {
        ScrapeError::InvalidUrl(err.to_string())
    }
}

/// Result type alias for page-trawl operations
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{BatchScraper, PageScraper, SiteCrawler};
pub use html::{sanitize, HtmlSanitizer};
pub use markdown::{to_markdown, MarkdownConverter};
pub use tools::Toolkit;
pub use crate::url::{matches, normalize_url};
