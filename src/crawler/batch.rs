//! Bounded-concurrency batch scraping
//!
//! URLs are processed in chunks of `max_concurrent`. Every URL in a chunk is
//! scraped concurrently, the whole chunk is awaited, and a pause separates
//! consecutive chunks. One URL failing never affects the others.

use crate::config::MAX_CONCURRENT_RANGE;
use crate::crawler::page::{PageScraper, ScrapeOptions, ScrapedPage};
use crate::crawler::pause;
use crate::progress::ProgressReporter;
use crate::ScrapeError;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default pause between chunks
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(1_000);

/// Result of scraping one URL in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum PageOutcome {
    Success { url: String, page: ScrapedPage },
    Failure { url: String, message: String },
}

impl PageOutcome {
    /// The URL this outcome belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. } | Self::Failure { url, .. } => url,
        }
    }

    /// Returns true for successful scrapes
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Outcome of a whole batch, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub results: Vec<PageOutcome>,
    pub successful: usize,
    pub failed: usize,
}

/// Scrapes lists of URLs with bounded concurrency
#[derive(Debug, Clone)]
pub struct BatchScraper {
    scraper: Arc<PageScraper>,
    chunk_delay: Duration,
}

impl BatchScraper {
    /// Creates a batch scraper with the default chunk delay
    pub fn new(scraper: Arc<PageScraper>) -> Self {
        Self {
            scraper,
            chunk_delay: DEFAULT_CHUNK_DELAY,
        }
    }

    /// Sets the pause between chunks
    pub fn with_chunk_delay(mut self, chunk_delay: Duration) -> Self {
        self.chunk_delay = chunk_delay;
        self
    }

    /// Scrapes every URL, at most `max_concurrent` at a time
    ///
    /// # Arguments
    ///
    /// * `urls` - URLs to scrape; results keep this order
    /// * `max_concurrent` - Chunk size, between 1 and 15
    /// * `options` - Extraction options applied to every page
    /// * `progress` - Receives one event per chunk and a final summary
    /// * `cancel` - Aborts the batch at the next fetch or pause
    ///
    /// # Returns
    ///
    /// * `Ok(BatchReport)` - One outcome per URL
    /// * `Err(ScrapeError::InvalidArgument)` - `max_concurrent` is out of range
    /// * `Err(ScrapeError::Cancelled)` - The batch was cancelled
    pub async fn scrape_batch(
        &self,
        urls: &[String],
        max_concurrent: usize,
        options: &ScrapeOptions,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<BatchReport, ScrapeError> {
        if !MAX_CONCURRENT_RANGE.contains(&max_concurrent) {
            return Err(ScrapeError::InvalidArgument(format!(
                "max_concurrent must be between {} and {}, got {}",
                MAX_CONCURRENT_RANGE.start(),
                MAX_CONCURRENT_RANGE.end(),
                max_concurrent
            )));
        }

        tracing::info!(
            "Scraping {} URLs, {} at a time",
            urls.len(),
            max_concurrent
        );

        let mut results = Vec::with_capacity(urls.len());
        let chunk_count = urls.len().div_ceil(max_concurrent);

        for (index, chunk) in urls.chunks(max_concurrent).enumerate() {
            if index > 0 {
                pause(self.chunk_delay, cancel).await?;
            }

            let first = index * max_concurrent + 1;
            progress.in_progress(
                "chunk",
                format!(
                    "Scraping URLs {}-{} of {} (chunk {}/{})",
                    first,
                    first + chunk.len() - 1,
                    urls.len(),
                    index + 1,
                    chunk_count
                ),
            );

            let scrapes = chunk.iter().map(|url| async move {
                let outcome = self.scraper.scrape(url, options, cancel).await;
                (url, outcome)
            });

            for (url, outcome) in join_all(scrapes).await {
                match outcome {
                    Ok(page) => results.push(PageOutcome::Success {
                        url: url.clone(),
                        page,
                    }),
                    Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                    Err(e) => {
                        tracing::warn!("Failed to scrape {}: {}", url, e);
                        results.push(PageOutcome::Failure {
                            url: url.clone(),
                            message: e.to_string(),
                        });
                    }
                }
            }
        }

        let successful = results.iter().filter(|r| r.is_success()).count();
        let failed = results.len() - successful;

        tracing::info!("Batch finished: {} succeeded, {} failed", successful, failed);
        progress.done(
            "batch",
            format!("Scraped {} URLs: {} succeeded, {} failed", urls.len(), successful, failed),
        );

        Ok(BatchReport {
            results,
            successful,
            failed,
        })
    }
}
