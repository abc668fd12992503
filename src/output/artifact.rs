//! Saved artifacts: crawl inventories and scraped Markdown
//!
//! File names derived from caller input are reduced to a safe character set
//! here; the store's path guard still checks the final path.

use crate::crawler::{CrawlReport, PageRecord};
use crate::store::{ContentStore, StoreResult};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// JSON document written for a finished crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlArtifact {
    pub base_url: String,
    /// RFC 3339 timestamp of when the crawl finished
    pub crawled_at: String,
    pub pages: Vec<PageRecord>,
}

impl CrawlArtifact {
    /// Builds the artifact for a crawl report
    pub fn from_report(report: &CrawlReport, crawled_at: DateTime<Utc>) -> Self {
        Self {
            base_url: report.base_url.clone(),
            crawled_at: crawled_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            pages: report.pages.clone(),
        }
    }

    /// Serializes the artifact as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Reduces a caller-supplied file name to `[a-zA-Z0-9-_.]`
///
/// Other characters become `_`, and leading dots are removed so the result
/// can never name a parent directory or a hidden file. Returns `None` when
/// nothing usable remains.
///
/// # Examples
///
/// ```
/// use page_trawl::output::sanitize_filename;
///
/// assert_eq!(sanitize_filename("my notes/v1.md"), Some("my_notes_v1.md".to_string()));
/// assert_eq!(sanitize_filename("../../etc/passwd"), Some("_.._etc_passwd".to_string()));
/// assert_eq!(sanitize_filename("..."), None);
/// ```
pub fn sanitize_filename(name: &str) -> Option<String> {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_' || c == '.') {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// File name for a Markdown artifact
///
/// Uses the sanitized caller name (with `.md` appended if missing) or
/// `scraped_<timestamp>.md` when no usable name was given.
pub fn markdown_filename(requested: Option<&str>, now: DateTime<Utc>) -> String {
    match requested.and_then(sanitize_filename) {
        Some(name) if name.to_ascii_lowercase().ends_with(".md") => name,
        Some(name) => format!("{}.md", name),
        None => format!("scraped_{}.md", file_timestamp(now)),
    }
}

/// File name for a crawl artifact: `crawl_<host>_<timestamp>.json`
pub fn crawl_artifact_filename(base_url: &str, now: DateTime<Utc>) -> String {
    let host = url::Url::parse(base_url)
        .ok()
        .and_then(|u| u.host_str().and_then(sanitize_filename))
        .unwrap_or_else(|| "site".to_string());
    format!("crawl_{}_{}.json", host, file_timestamp(now))
}

/// Writes a crawl artifact below the store root
pub async fn save_crawl_artifact(
    store: &ContentStore,
    report: &CrawlReport,
    now: DateTime<Utc>,
) -> StoreResult<PathBuf> {
    let artifact = CrawlArtifact::from_report(report, now);
    let json = artifact
        .to_json()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    store
        .write(&crawl_artifact_filename(&report.base_url, now), json.as_bytes())
        .await
}

/// Writes Markdown below the store root under a sanitized name
pub async fn save_markdown(
    store: &ContentStore,
    requested: Option<&str>,
    markdown: &str,
    now: DateTime<Utc>,
) -> StoreResult<PathBuf> {
    store
        .write(&markdown_filename(requested, now), markdown.as_bytes())
        .await
}

/// RFC 3339 timestamp with `:` replaced so it is valid in file names
fn file_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, true).replace(':', "-")
}
