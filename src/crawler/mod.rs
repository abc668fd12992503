//! Crawler module for page fetching and processing
//!
//! This module contains the scraping logic, including:
//! - Single-page scraping (fetch, sanitize, convert, extract)
//! - Bounded-concurrency batch scraping with inter-chunk pacing
//! - Breadth-first site crawling with cycle avoidance
//! - Link and selector extraction from sanitized HTML

mod batch;
mod extract;
mod page;
mod site;

#[cfg(test)]
pub(crate) mod testing;

pub use batch::{BatchReport, BatchScraper, PageOutcome, DEFAULT_CHUNK_DELAY};
pub use extract::{extract_elements, extract_links, resolve_link, ExtractedElement};
pub use page::{PageScraper, ScrapeOptions, ScrapedPage};
pub use site::{
    CrawlOptions, CrawlReport, CrawlState, PageRecord, SiteCrawler, DEFAULT_LINK_DELAY,
    MAX_LINK_DELAY,
};

use crate::ScrapeError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleeps for `delay` unless `cancel` fires first
pub(crate) async fn pause(delay: Duration, cancel: &CancellationToken) -> Result<(), ScrapeError> {
    if delay.is_zero() {
        return if cancel.is_cancelled() {
            Err(ScrapeError::Cancelled)
        } else {
            Ok(())
        };
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ScrapeError::Cancelled),
        _ = tokio::time::sleep(delay) => Ok(()),
    }
}
