//! Integration tests for the tool API

use crate::{html_page, http_scraper, mount};
use page_trawl::config::{parse_config, Config};
use page_trawl::progress::ProgressReporter;
use page_trawl::store::{ContentStore, StoreError};
use page_trawl::Toolkit;
use serde_json::{json, Value};
use std::time::Duration;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use wiremock::{MockServer, ResponseTemplate};

fn test_config(root: &std::path::Path) -> Config {
    let mut config = parse_config(
        r#"
        [crawler]
        link-delay-ms = 0

        [batch]
        chunk-delay-ms = 0
        "#,
    )
    .expect("config should parse");
    config.output.root_dir = root.to_path_buf();
    config
}

async fn call(toolkit: &Toolkit, operation: &str, input: Value) -> Value {
    toolkit
        .dispatch(
            operation,
            input,
            &ProgressReporter::silent(),
            &CancellationToken::new(),
        )
        .await
}

#[tokio::test]
async fn test_scrape_page_end_to_end() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/article",
        html_page(
            r#"<html><head><title>Article</title></head><body>
            <h1>Heading</h1>
            <p onclick="track()">Body <a href="/next" onmouseover="x()">next</a></p>
            <script>steal()</script>
            <ul class="tags"><li data-id="1">rust</li><li data-id="2">html</li></ul>
            </body></html>"#,
        ),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let toolkit = Toolkit::with_scraper(http_scraper(Duration::from_secs(5)), &test_config(dir.path()));

    let response = call(
        &toolkit,
        "scrape_page",
        json!({
            "url": format!("{}/article", server.uri()),
            "include_html": true,
            "selector": "li",
            "save_markdown": true,
            "filename": "article"
        }),
    )
    .await;

    assert_eq!(response["status"], "success", "{}", response);
    let page = &response["page"];
    assert_eq!(page["title"], "Article");
    assert_eq!(page["statusCode"], 200);

    let markdown = page["markdown"].as_str().unwrap();
    assert!(markdown.starts_with("# Heading"));
    assert!(!markdown.contains("steal"));

    let html = page["html"].as_str().unwrap();
    assert!(!html.contains("onclick"));
    assert!(!html.contains("<script"));

    assert_eq!(page["links"][0], format!("{}/next", server.uri()));
    assert_eq!(page["elements"][1]["text"], "html");
    assert_eq!(page["elements"][1]["attributes"]["data-id"], "2");

    let saved = response["savedPath"].as_str().unwrap();
    assert!(saved.ends_with("article.md"));
    assert_eq!(std::fs::read_to_string(saved).unwrap(), markdown);
}

#[tokio::test]
async fn test_crawl_site_artifact_and_listing() {
    let server = MockServer::start().await;
    mount(&server, "/", html_page(r#"<a href="/docs">docs</a>"#)).await;
    mount(&server, "/docs", html_page("<h1>Docs</h1>")).await;

    let dir = TempDir::new().unwrap();
    let toolkit = Toolkit::with_scraper(http_scraper(Duration::from_secs(5)), &test_config(dir.path()));

    let response = call(
        &toolkit,
        "crawl_site",
        json!({"url": format!("{}/", server.uri()), "max_depth": 1, "save_artifact": true}),
    )
    .await;
    assert_eq!(response["status"], "success", "{}", response);
    assert_eq!(response["totalPages"], 2);

    let listing = call(&toolkit, "list_files", json!({"pattern": "crawl_*.json"})).await;
    assert_eq!(listing["status"], "success");
    let files = listing["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0]["size"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_crawl_site_rejects_out_of_range_depth() {
    let dir = TempDir::new().unwrap();
    let toolkit = Toolkit::with_scraper(http_scraper(Duration::from_secs(5)), &test_config(dir.path()));

    let response = call(
        &toolkit,
        "crawl_site",
        json!({"url": "http://127.0.0.1:9/", "max_depth": 9}),
    )
    .await;
    assert_eq!(response["status"], "error");
    assert!(response["errorMessage"].as_str().unwrap().contains("max_depth"));
}

#[tokio::test]
async fn test_store_rejects_traversal() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("output");
    let store = ContentStore::new(&root);

    let err = store.write("../escaped.md", b"nope").await.unwrap_err();
    assert!(matches!(err, StoreError::Path(_)));
    assert!(!dir.path().join("escaped.md").exists());

    let path = store.write("nested/../inside.md", b"ok").await.unwrap();
    assert!(path.ends_with("inside.md"));
    assert!(root.join("inside.md").exists());
}

#[tokio::test]
async fn test_unknown_operation_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let toolkit = Toolkit::with_scraper(http_scraper(Duration::from_secs(5)), &test_config(dir.path()));

    let response = call(&toolkit, "render_javascript", json!({})).await;
    assert_eq!(
        response,
        json!({"status": "error", "errorMessage": "Unknown operation: render_javascript"})
    );
}

#[tokio::test]
async fn test_markup_under_binary_content_type_is_sanitized() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/blob",
        ResponseTemplate::new(200).set_body_raw(
            r#"<p onclick="steal()">hi</p><script>alert(1)</script>"#,
            "application/octet-stream",
        ),
    )
    .await;
    mount(
        &server,
        "/notes.txt",
        ResponseTemplate::new(200).set_body_raw("if a < b && c > d", "text/plain"),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let toolkit = Toolkit::with_scraper(http_scraper(Duration::from_secs(5)), &test_config(dir.path()));

    let response = call(
        &toolkit,
        "scrape_page",
        json!({"url": format!("{}/blob", server.uri()), "save_markdown": true, "filename": "blob"}),
    )
    .await;
    assert_eq!(response["status"], "success", "{}", response);
    let markdown = response["page"]["markdown"].as_str().unwrap();
    assert!(markdown.contains("hi"));
    assert!(!markdown.contains("<script"));
    assert!(!markdown.contains("onclick"));
    let saved = std::fs::read_to_string(response["savedPath"].as_str().unwrap()).unwrap();
    assert!(!saved.contains("alert(1)"));

    let response = call(
        &toolkit,
        "scrape_page",
        json!({"url": format!("{}/notes.txt", server.uri())}),
    )
    .await;
    assert_eq!(response["page"]["markdown"], "if a &lt; b &amp;&amp; c &gt; d");
}
