//! Integration tests against mock HTTP servers

mod batch_tests;
mod crawl_tests;
mod tool_tests;

use page_trawl::crawler::PageScraper;
use page_trawl::fetch::{ClientPool, FetchOptions};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An HTML response
pub fn html_page(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

/// Mounts a GET handler returning `template` for `route`
pub async fn mount(server: &MockServer, route: &str, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(template)
        .mount(server)
        .await;
}

/// A real HTTP scraper with the given per-request timeout
pub fn http_scraper(timeout: Duration) -> Arc<PageScraper> {
    let pool = Arc::new(ClientPool::new("page-trawl-tests/1.0"));
    let options = FetchOptions {
        timeout,
        ..FetchOptions::default()
    };
    Arc::new(PageScraper::with_pool(pool, options))
}
