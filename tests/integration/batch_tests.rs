//! Integration tests for batch scraping over HTTP

use crate::{html_page, http_scraper, mount};
use page_trawl::crawler::{BatchScraper, PageOutcome, ScrapeOptions};
use page_trawl::progress::ProgressReporter;
use page_trawl::ScrapeError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::{MockServer, ResponseTemplate};

#[tokio::test]
async fn test_batch_of_seven_with_two_failures() {
    let server = MockServer::start().await;

    for i in 0..5 {
        mount(
            &server,
            &format!("/ok{}", i),
            html_page(format!("<html><head><title>Page {0}</title></head><body><h1>Page {0}</h1></body></html>", i)),
        )
        .await;
    }
    mount(&server, "/missing", ResponseTemplate::new(404)).await;
    mount(&server, "/broken", ResponseTemplate::new(503)).await;

    let mut urls: Vec<String> = (0..5).map(|i| format!("{}/ok{}", server.uri(), i)).collect();
    urls.insert(2, format!("{}/missing", server.uri()));
    urls.push(format!("{}/broken", server.uri()));

    let events = Arc::new(Mutex::new(Vec::new()));
    let captured = Arc::clone(&events);
    let progress = ProgressReporter::new(move |e| captured.lock().unwrap().push(e.message));

    let batch = BatchScraper::new(http_scraper(Duration::from_secs(5))).with_chunk_delay(Duration::ZERO);
    let report = batch
        .scrape_batch(&urls, 3, &ScrapeOptions::default(), &progress, &CancellationToken::new())
        .await
        .expect("batch failed");

    assert_eq!(report.results.len(), 7);
    assert_eq!(report.successful, 5);
    assert_eq!(report.failed, 2);

    let order: Vec<&str> = report.results.iter().map(|r| r.url()).collect();
    let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
    assert_eq!(order, expected);

    match &report.results[0] {
        PageOutcome::Success { page, .. } => {
            assert_eq!(page.title.as_deref(), Some("Page 0"));
            assert_eq!(page.markdown, "# Page 0");
        }
        other => panic!("expected success, got {:?}", other),
    }
    assert!(matches!(&report.results[2], PageOutcome::Failure { message, .. } if message.contains("404")));

    let events = events.lock().unwrap();
    assert_eq!(events[0], "Scraping URLs 1-3 of 7 (chunk 1/3)");
    assert_eq!(events.len(), 4);
}

#[tokio::test]
async fn test_slow_page_times_out_without_failing_batch() {
    let server = MockServer::start().await;

    mount(&server, "/fast", html_page("<p>fast</p>")).await;
    mount(
        &server,
        "/slow",
        html_page("<p>slow</p>").set_delay(Duration::from_secs(3)),
    )
    .await;

    let urls = vec![
        format!("{}/fast", server.uri()),
        format!("{}/slow", server.uri()),
    ];

    let batch = BatchScraper::new(http_scraper(Duration::from_millis(300))).with_chunk_delay(Duration::ZERO);
    let report = batch
        .scrape_batch(
            &urls,
            2,
            &ScrapeOptions::default(),
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.successful, 1);
    assert_eq!(report.failed, 1);
    match &report.results[1] {
        PageOutcome::Failure { message, .. } => assert!(message.contains("timed out"), "{}", message),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_cancellation_stops_batch() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/slow",
        html_page("<p>slow</p>").set_delay(Duration::from_secs(10)),
    )
    .await;

    let urls = vec![format!("{}/slow", server.uri())];
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let batch = BatchScraper::new(http_scraper(Duration::from_secs(30)));
    let started = std::time::Instant::now();
    let err = batch
        .scrape_batch(
            &urls,
            1,
            &ScrapeOptions::default(),
            &ProgressReporter::silent(),
            &cancel,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ScrapeError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}
