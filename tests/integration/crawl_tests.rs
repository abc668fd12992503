//! Integration tests for the site crawler
//!
//! These tests use wiremock to serve a small site and run full crawls over
//! real HTTP.

use crate::{html_page, http_scraper, mount};
use page_trawl::crawler::{CrawlOptions, SiteCrawler};
use page_trawl::progress::ProgressReporter;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn options(max_depth: u32, max_pages: usize) -> CrawlOptions {
    CrawlOptions {
        max_depth,
        max_pages,
        link_delay: Duration::ZERO,
        ..CrawlOptions::default()
    }
}

#[tokio::test]
async fn test_depth_one_crawl_with_external_link() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html_page(
            r#"<html><head><title>Home</title></head><body>
            <a href="/a">A</a>
            <a href="/b">B</a>
            <a href="/c">C</a>
            <a href="https://elsewhere.example.org/page">Elsewhere</a>
            </body></html>"#,
        ),
    )
    .await;
    for route in ["/a", "/b", "/c"] {
        mount(
            &server,
            route,
            html_page(format!(
                r#"<html><head><title>{0}</title></head><body><a href="{0}/deeper">deeper</a></body></html>"#,
                route
            )),
        )
        .await;
    }

    let crawler = SiteCrawler::new(http_scraper(Duration::from_secs(5)));
    let seed = format!("{}/", server.uri());
    let mut opts = options(1, 50);
    opts.include_external = true;

    let report = crawler
        .crawl(&seed, &opts, &ProgressReporter::silent(), &CancellationToken::new())
        .await
        .expect("crawl failed");

    assert!(report.total_pages <= 4);
    assert_eq!(report.total_pages, 4);
    assert!(report.pages.iter().all(|p| p.depth <= 1));

    let home = &report.pages[0];
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.internal_links.len(), 3);
    assert_eq!(
        home.external_links,
        vec!["https://elsewhere.example.org/page".to_string()]
    );
    assert!(report
        .pages
        .iter()
        .all(|p| !p.url.contains("elsewhere.example.org")));
    assert!(report.pages.iter().all(|p| !p.url.ends_with("/deeper")));
}

#[tokio::test]
async fn test_shared_page_fetched_once() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/",
        html_page(r#"<a href="/x">x</a><a href="/y">y</a>"#),
    )
    .await;
    mount(&server, "/x", html_page(r#"<a href="/shared">s</a><a href="/">home</a>"#)).await;
    mount(&server, "/y", html_page(r#"<a href="/shared">s</a>"#)).await;

    Mock::given(method("GET"))
        .and(path("/shared"))
        .respond_with(html_page("<p>shared</p>"))
        .expect(1)
        .mount(&server)
        .await;

    let crawler = SiteCrawler::new(http_scraper(Duration::from_secs(5)));
    let report = crawler
        .crawl(
            &format!("{}/", server.uri()),
            &options(3, 50),
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_pages, 4);
    let shared: Vec<_> = report
        .pages
        .iter()
        .filter(|p| p.url.ends_with("/shared"))
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].depth, 2);
}

#[tokio::test]
async fn test_page_budget_and_failures() {
    let server = MockServer::start().await;

    let links: String = (0..10)
        .map(|i| format!(r#"<a href="/p{}">p{}</a>"#, i, i))
        .collect();
    mount(&server, "/", html_page(links)).await;
    mount(&server, "/p0", ResponseTemplate::new(500)).await;
    for i in 1..10 {
        mount(&server, &format!("/p{}", i), html_page("<p>leaf</p>")).await;
    }

    let crawler = SiteCrawler::new(http_scraper(Duration::from_secs(5)));
    let report = crawler
        .crawl(
            &format!("{}/", server.uri()),
            &options(2, 4),
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_pages, 4);
    assert_eq!(report.failed_urls, vec![format!("{}/p0", server.uri())]);
}

#[tokio::test]
async fn test_unreachable_seed_is_recorded() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let crawler = SiteCrawler::new(http_scraper(Duration::from_secs(2)));
    let report = crawler
        .crawl(
            &format!("{}/", uri),
            &options(1, 5),
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.total_pages, 0);
    assert_eq!(report.failed_urls.len(), 1);
}

#[tokio::test]
async fn test_directory_style_links_fetched_as_linked() {
    let server = MockServer::start().await;

    mount(&server, "/", html_page(r#"<a href="/docs/">Docs</a>"#)).await;
    mount(
        &server,
        "/docs/",
        html_page(r#"<html><head><title>Docs</title></head><body><a href="intro">Intro</a></body></html>"#),
    )
    .await;
    mount(&server, "/docs/intro", html_page("<p>intro</p>")).await;

    let crawler = SiteCrawler::new(http_scraper(Duration::from_secs(5)));
    let seed = format!("{}/", server.uri());

    let report = crawler
        .crawl(&seed, &options(2, 50), &ProgressReporter::silent(), &CancellationToken::new())
        .await
        .expect("crawl failed");

    assert!(report.failed_urls.is_empty(), "failed: {:?}", report.failed_urls);
    assert_eq!(report.total_pages, 3);
    let urls: Vec<_> = report.pages.iter().map(|p| p.url.clone()).collect();
    assert!(urls.contains(&format!("{}/docs/", server.uri())));
    assert!(urls.contains(&format!("{}/docs/intro", server.uri())));

    // Seeding at the directory URL works the same way
    let report = crawler
        .crawl(
            &format!("{}/docs/", server.uri()),
            &options(1, 50),
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
        .expect("crawl failed");
    assert_eq!(report.total_pages, 2);
    assert!(report.failed_urls.is_empty());
}
