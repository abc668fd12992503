//! Output module for saved artifacts and reports
//!
//! This module handles:
//! - Crawl inventory artifacts written as JSON
//! - Safe file names for saved Markdown
//! - Markdown summaries of crawl and batch reports

mod artifact;
mod summary;

pub use artifact::{
    crawl_artifact_filename, markdown_filename, sanitize_filename, save_crawl_artifact,
    save_markdown, CrawlArtifact,
};
pub use summary::{format_batch_summary, format_crawl_summary};
