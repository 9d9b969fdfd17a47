//! Character links from wiki category listings.

use crate::dom;
use scraper::Html;

const MEMBER_LINK: &str = ".category-page__member-link";

/// Absolute URLs of every member link on a category page, in page order.
///
/// Relative hrefs are joined onto `base_url`. A page with no member links
/// gives an empty list.
pub fn harvest(document: &Html, base_url: &str) -> Vec<String> {
    let Some(anchors) = dom::query_all(Some(document.root_element()), MEMBER_LINK) else {
        return Vec::new();
    };

    let links: Vec<String> = anchors
        .into_iter()
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .map(|href| absolute_url(base_url, href))
        .collect();

    log::debug!("Harvested {} character links", links.len());
    links
}

/// Parse a category page and harvest its links.
pub fn harvest_page(html: &str, base_url: &str) -> Vec<String> {
    dom::parse_html(html)
        .map(|document| harvest(&document, base_url))
        .unwrap_or_default()
}

fn absolute_url(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{}{}", base, href)
    } else {
        format!("{}/{}", base, href)
    }
}
