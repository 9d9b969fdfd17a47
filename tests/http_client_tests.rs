mod common;

use common::{serve, serve_in_order, wiki_server};
use httpmock::prelude::*;
use dokkan_scraper::http_client::{HttpClient, HttpClientConfig};
use std::time::Duration;

fn quick_config(max_retries: usize) -> HttpClientConfig {
    HttpClientConfig {
        timeout: Duration::from_secs(5),
        max_retries,
        initial_retry_delay_ms: 10,
        max_retry_delay_ms: 50,
        ..HttpClientConfig::default()
    }
}

#[tokio::test]
async fn test_fetch_success() {
    let server = wiki_server().await;
    serve(&server, "/wiki/Goku", 200, "<html><body>Goku</body></html>").await;

    let client = HttpClient::with_config(quick_config(0)).expect("Failed to create client");
    let body = client.fetch_page(&server.url("/wiki/Goku")).await;

    assert_eq!(body.as_deref(), Some("<html><body>Goku</body></html>"));
    assert!(client.take_errors().is_empty());
}

#[tokio::test]
async fn test_retry_on_server_error() {
    let server = wiki_server().await;
    serve_in_order(
        &server,
        "/wiki/Flaky",
        &[(503, "busy"), (429, "slow down"), (200, "finally")],
    )
    .await;

    let client = HttpClient::with_config(quick_config(3)).unwrap();
    let body = client.get_text(&server.url("/wiki/Flaky")).await;

    assert_eq!(body.unwrap(), "finally");
}

#[tokio::test]
async fn test_retries_exhausted() {
    let server = wiki_server().await;
    let down = server
        .mock_async(|when, then| {
            when.method(GET).path("/wiki/Down");
            then.status(503).body("busy");
        })
        .await;

    let client = HttpClient::with_config(quick_config(2)).unwrap();
    let url = server.url("/wiki/Down");
    assert!(client.fetch_page(&url).await.is_none());

    let errors = client.take_errors();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].url, url);
    assert_eq!(errors[0].retry_attempt, 2);
    down.assert_hits_async(3).await;
}

#[tokio::test]
async fn test_not_found_is_not_retried() {
    let server = wiki_server().await;
    let gone = server
        .mock_async(|when, then| {
            when.method(GET).path("/wiki/Gone");
            then.status(404).body("missing");
        })
        .await;

    let client = HttpClient::with_config(quick_config(3)).unwrap();
    let result = client.get_with_retry(&server.url("/wiki/Gone")).await;

    let err = result.expect_err("404 should fail without retrying");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(404));
    gone.assert_hits_async(1).await;
}
