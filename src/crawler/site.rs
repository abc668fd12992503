//! Breadth-first site crawler
//!
//! The crawl is a worklist loop over a FIFO frontier. A URL is marked visited
//! when it is enqueued, so a page linked from many places is fetched once and
//! cycles end without any extra bookkeeping.
//!
//! Visited keys are normalized URLs, but pages are fetched and recorded under
//! the URL as it was linked. Normalization drops trailing slashes, and a
//! server that distinguishes `/docs/` from `/docs` must still see `/docs/`.

use crate::config::{MAX_DEPTH_RANGE, MAX_PAGES_RANGE};
use crate::crawler::page::{PageScraper, ScrapeOptions};
use crate::crawler::pause;
use crate::progress::ProgressReporter;
use crate::url::{classify_link, matches, normalize_parsed, LinkScope};
use crate::{ScrapeError, UrlError};
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Default pause between page fetches
pub const DEFAULT_LINK_DELAY: Duration = Duration::from_millis(200);

/// Upper bound for the pause after repeated rate limiting
pub const MAX_LINK_DELAY: Duration = Duration::from_secs(5);

/// Bounds and filters for one crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOptions {
    /// Maximum link distance from the seed (1-5)
    pub max_depth: u32,
    /// Maximum number of page records (1-200)
    pub max_pages: usize,
    /// Keep external links in page records
    pub include_external: bool,
    /// Wildcard pattern internal links must match to be followed
    pub link_filter: Option<String>,
    /// Pause between page fetches
    pub link_delay: Duration,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_pages: 50,
            include_external: false,
            link_filter: None,
            link_delay: DEFAULT_LINK_DELAY,
        }
    }
}

impl CrawlOptions {
    /// Checks depth and page budget ranges
    pub fn validate(&self) -> Result<(), ScrapeError> {
        if !MAX_DEPTH_RANGE.contains(&self.max_depth) {
            return Err(ScrapeError::InvalidArgument(format!(
                "max_depth must be between {} and {}, got {}",
                MAX_DEPTH_RANGE.start(),
                MAX_DEPTH_RANGE.end(),
                self.max_depth
            )));
        }
        if !MAX_PAGES_RANGE.contains(&self.max_pages) {
            return Err(ScrapeError::InvalidArgument(format!(
                "max_pages must be between {} and {}, got {}",
                MAX_PAGES_RANGE.start(),
                MAX_PAGES_RANGE.end(),
                self.max_pages
            )));
        }
        Ok(())
    }
}

/// One visited page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub url: String,
    pub title: Option<String>,
    /// Distance from the seed in links
    pub depth: u32,
    pub internal_links: Vec<String>,
    pub external_links: Vec<String>,
}

/// Everything a crawl found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrawlReport {
    pub base_url: String,
    pub pages: Vec<PageRecord>,
    pub total_pages: usize,
    /// URLs whose fetch failed; they have no page record
    pub failed_urls: Vec<String>,
}

/// Mutable state owned by a single crawl
#[derive(Debug, Default)]
pub struct CrawlState {
    visited: HashSet<String>,
    frontier: VecDeque<(Url, u32)>,
    pages: Vec<PageRecord>,
    failed: Vec<String>,
}

/// Key under which equivalent URLs are deduplicated
fn visit_key(url: &Url) -> String {
    normalize_parsed(url.clone())
        .map(|normalized| normalized.to_string())
        .unwrap_or_else(|_| url.to_string())
}

impl CrawlState {
    /// Queues a URL unless an equivalent one was seen before; returns whether
    /// it was queued
    ///
    /// The URL is queued as given, minus its fragment.
    pub fn enqueue(&mut self, mut url: Url, depth: u32) -> bool {
        url.set_fragment(None);
        if !self.visited.insert(visit_key(&url)) {
            return false;
        }
        self.frontier.push_back((url, depth));
        true
    }

    /// Takes the next URL in breadth-first order
    pub fn next(&mut self) -> Option<(Url, u32)> {
        self.frontier.pop_front()
    }

    /// Returns true if the URL or an equivalent one was ever queued
    pub fn is_visited(&self, url: &str) -> bool {
        Url::parse(url).map_or(false, |url| self.visited.contains(&visit_key(&url)))
    }

    /// Number of page records collected so far
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Walks a site's internal link graph
#[derive(Debug, Clone)]
pub struct SiteCrawler {
    scraper: Arc<PageScraper>,
}

impl SiteCrawler {
    /// Creates a crawler that fetches through `scraper`
    pub fn new(scraper: Arc<PageScraper>) -> Self {
        Self { scraper }
    }

    /// Crawls from `seed` breadth first
    ///
    /// # Termination
    ///
    /// The crawl stops when `max_pages` records exist, when the frontier is
    /// empty, or when `cancel` fires. Links are only enqueued while their
    /// depth stays within `max_depth`.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Pages in visit order plus the URLs that failed
    /// * `Err(ScrapeError::InvalidArgument)` - Options out of range
    /// * `Err(ScrapeError::InvalidUrl)` - The seed is not an http(s) URL
    /// * `Err(ScrapeError::Cancelled)` - The crawl was cancelled
    pub async fn crawl(
        &self,
        seed: &str,
        options: &CrawlOptions,
        progress: &ProgressReporter,
        cancel: &CancellationToken,
    ) -> Result<CrawlReport, ScrapeError> {
        options.validate()?;
        let mut seed_url = Url::parse(seed.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
        // Rejects non-http(s) seeds and seeds without a host
        normalize_parsed(seed_url.clone())?;
        seed_url.set_fragment(None);

        tracing::info!(
            "Starting crawl of {} (max depth {}, max pages {})",
            seed_url,
            options.max_depth,
            options.max_pages
        );

        let mut state = CrawlState::default();
        state.enqueue(seed_url.clone(), 0);

        let mut delay = options.link_delay;
        let mut fetched = 0usize;
        let scrape_options = ScrapeOptions::default();

        while let Some((url, depth)) = state.next() {
            if state.page_count() >= options.max_pages {
                tracing::info!("Page budget of {} reached", options.max_pages);
                break;
            }

            if fetched > 0 {
                pause(delay, cancel).await?;
            }
            fetched += 1;

            progress.in_progress(
                "crawl",
                format!("Crawling {} (depth {}, {} pages so far)", url, depth, state.page_count()),
            );

            let page = match self.scraper.scrape(url.as_str(), &scrape_options, cancel).await {
                Ok(page) => page,
                Err(ScrapeError::Cancelled) => return Err(ScrapeError::Cancelled),
                Err(e) => {
                    if e.status_code() == Some(429) {
                        delay = (delay * 2).clamp(DEFAULT_LINK_DELAY, MAX_LINK_DELAY);
                        tracing::warn!("Rate limited at {}, link delay now {:?}", url, delay);
                    }
                    tracing::warn!("Failed to crawl {}: {}", url, e);
                    state.failed.push(url.to_string());
                    continue;
                }
            };

            let mut internal_links = Vec::new();
            let mut external_links = Vec::new();
            let mut seen = HashSet::new();

            for link in &page.links {
                let Ok(mut link) = Url::parse(link) else {
                    continue;
                };
                link.set_fragment(None);
                let Ok(key) = normalize_parsed(link.clone()) else {
                    continue;
                };
                if !seen.insert(key.to_string()) {
                    continue;
                }

                let scope = classify_link(&link, &seed_url);
                tracing::trace!("{} -> {} ({:?})", url, link, scope);

                match scope {
                    LinkScope::Internal => {
                        let allowed = options
                            .link_filter
                            .as_deref()
                            .map_or(true, |pattern| matches(link.as_str(), pattern));
                        if allowed && depth < options.max_depth {
                            state.enqueue(link.clone(), depth + 1);
                        }
                        internal_links.push(link.to_string());
                    }
                    LinkScope::External => {
                        if options.include_external {
                            external_links.push(link.to_string());
                        }
                    }
                }
            }

            tracing::debug!(
                "Visited {} at depth {}: {} internal, {} external links",
                url,
                depth,
                internal_links.len(),
                external_links.len()
            );

            state.pages.push(PageRecord {
                url: url.to_string(),
                title: page.title,
                depth,
                internal_links,
                external_links,
            });
        }

        let total_pages = state.pages.len();
        tracing::info!(
            "Crawl of {} finished: {} pages, {} failures",
            seed_url,
            total_pages,
            state.failed.len()
        );
        progress.done(
            "crawl",
            format!("Crawled {} pages from {}", total_pages, seed_url),
        );

        Ok(CrawlReport {
            base_url: seed_url.to_string(),
            pages: state.pages,
            total_pages,
            failed_urls: state.failed,
        })
    }
}
