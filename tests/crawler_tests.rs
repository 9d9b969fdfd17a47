mod common;

use common::{fixture, serve, wiki_server};
use dokkan_scraper::config::ScraperConfig;
use dokkan_scraper::crawler::Crawler;
use httpmock::MockServer;

fn category_page(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<li><a class="category-page__member-link" href="{href}">{href}</a></li>"#))
        .collect();
    format!("<html><body><ul>{anchors}</ul></body></html>")
}

async fn wiki() -> MockServer {
    let server = wiki_server().await;
    serve(
        &server,
        "/wiki/Category:Alpha",
        200,
        &category_page(&["/wiki/Standard", "/wiki/Missing", "/wiki/Events"]),
    )
    .await;
    serve(
        &server,
        "/wiki/Category:Beta",
        200,
        &category_page(&["/wiki/Standard", "/wiki/Eza"]),
    )
    .await;
    serve(&server, "/wiki/Standard", 200, &fixture("character_standard.html")).await;
    serve(&server, "/wiki/Eza", 200, &fixture("character_eza.html")).await;
    serve(&server, "/wiki/Events", 200, &fixture("no_card.html")).await;
    server
}

fn crawler_for(server: &MockServer) -> Crawler {
    let config = ScraperConfig {
        base_url: server.base_url(),
        max_retries: 0,
        retry_delay_ms: 10,
        max_retry_delay_ms: 10,
        batch_size: 2,
        concurrent_limit: 2,
        request_timeout_secs: 5,
        batch_delay_ms: 0,
        ..ScraperConfig::default()
    };
    Crawler::from_config(config).expect("Failed to create crawler")
}

#[tokio::test]
async fn test_category_links() {
    let server = wiki().await;
    let crawler = crawler_for(&server);

    let links = crawler.category_links("Beta").await;
    assert_eq!(
        links,
        vec![server.url("/wiki/Standard"), server.url("/wiki/Eza")]
    );
    assert!(crawler.category_links("Unknown").await.is_empty());
}

#[tokio::test]
async fn test_scrape_category_keeps_link_order() {
    let server = wiki().await;
    let crawler = crawler_for(&server);

    let (characters, progress) = crawler.scrape_category("Beta", None).await;
    let ids: Vec<_> = characters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1011420", "1002130"]);
    assert_eq!(progress.name, "Beta");
    assert_eq!(progress.links, 2);
    assert_eq!(progress.characters, 2);
}

#[tokio::test]
async fn test_scrape_all_dedups_and_reports_failures() {
    let server = wiki().await;
    let crawler = crawler_for(&server);
    let categories = vec!["Alpha".to_string(), "Beta".to_string()];

    let result = crawler.scrape_all(&categories, None).await;

    let ids: Vec<_> = result.characters.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["1011420", "1002130"]);
    assert_eq!(result.stats.total_characters, 2);
    assert_eq!(result.stats.categories_processed, categories);

    // The missing page fails; the card-less page is skipped without an error
    assert_eq!(result.stats.errors.len(), 1);
    assert_eq!(result.stats.errors[0].url, server.url("/wiki/Missing"));
}

#[tokio::test]
async fn test_scrape_all_respects_limit() {
    let server = wiki().await;
    let crawler = crawler_for(&server);
    let categories = vec!["Alpha".to_string(), "Beta".to_string()];

    let result = crawler.scrape_all(&categories, Some(1)).await;

    assert_eq!(result.characters.len(), 1);
    assert_eq!(result.characters[0].name, "Super Saiyan Goku");
    assert_eq!(result.stats.categories_processed, vec!["Alpha".to_string()]);
    assert!(result.stats.errors.is_empty());
}
