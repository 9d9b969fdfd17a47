//! Null-tolerant DOM helpers over the `scraper` crate.
//!
//! Every query accepts an optional scope and returns `None` or a fallback
//! value instead of failing, so extraction rules can chain lookups without
//! checking each step. Invalid selectors are logged and treated as "no match".

use crate::models::SENTINEL;
use scraper::{ElementRef, Html, Selector};

/// Parse raw markup into a document.
///
/// The HTML5 parser recovers from malformed markup, so the only input that
/// yields no document is one with no content at all.
pub fn parse_html(html: &str) -> Option<Html> {
    if html.trim().is_empty() {
        log::warn!("Refusing to parse empty HTML document");
        return None;
    }
    let document = Html::parse_document(html);
    if !document.errors.is_empty() {
        log::debug!("HTML parsed with {} recoverable errors", document.errors.len());
    }
    Some(document)
}

/// Compile a selector, logging instead of failing on invalid input.
pub fn selector(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(sel) => Some(sel),
        Err(e) => {
            log::warn!("Invalid selector \"{}\": {:?}", css, e);
            None
        }
    }
}

/// First descendant of `scope` matching `css`.
pub fn query<'a>(scope: Option<ElementRef<'a>>, css: &str) -> Option<ElementRef<'a>> {
    let scope = scope?;
    let sel = selector(css)?;
    scope.select(&sel).next()
}

/// All descendants of `scope` matching `css`, in document order.
pub fn query_all<'a>(scope: Option<ElementRef<'a>>, css: &str) -> Option<Vec<ElementRef<'a>>> {
    let scope = scope?;
    let sel = selector(css)?;
    Some(scope.select(&sel).collect())
}

/// Trimmed text content of `node`, or `fallback`.
pub fn text_of(node: Option<ElementRef<'_>>, fallback: &str) -> String {
    node.map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_else(|| fallback.to_string())
}

/// Trimmed text content, `None` when the node is missing.
pub fn text(node: Option<ElementRef<'_>>) -> Option<String> {
    node.map(|el| el.text().collect::<String>().trim().to_string())
}

/// Attribute value of `node`, or `fallback`.
pub fn attribute_of(node: Option<ElementRef<'_>>, name: &str, fallback: &str) -> String {
    node.and_then(|el| el.value().attr(name))
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Serialized inner HTML of `node`, or `fallback`.
pub fn inner_html_of(node: Option<ElementRef<'_>>, fallback: &str) -> String {
    node.map(|el| el.inner_html())
        .unwrap_or_else(|| fallback.to_string())
}

/// The next element sibling, skipping text and comment nodes.
pub fn next_sibling(node: Option<ElementRef<'_>>) -> Option<ElementRef<'_>> {
    node?.next_siblings().find_map(ElementRef::wrap)
}

/// The node itself or its nearest ancestor matching `css`.
pub fn closest<'a>(node: Option<ElementRef<'a>>, css: &str) -> Option<ElementRef<'a>> {
    let node = node?;
    let sel = selector(css)?;
    std::iter::once(node)
        .chain(node.ancestors().filter_map(ElementRef::wrap))
        .find(|el| sel.matches(el))
}

/// Selector for a section header tagged with the file name of its icon.
///
/// The wiki has no semantic ids; `data-image-name="Leader Skill.png"` and
/// friends are the anchors every skill rule starts from.
pub fn image_name_selector(image_name: &str) -> String {
    format!("[data-image-name=\"{}\"]", image_name)
}

/// First node under `scope` tagged with `data-image-name=image_name`.
pub fn find_by_image_name<'a>(scope: Option<ElementRef<'a>>, image_name: &str) -> Option<ElementRef<'a>> {
    query(scope, &image_name_selector(image_name))
}

/// Text of every node, each trimmed; `["Error"]` when the list itself is missing.
pub fn text_array(nodes: Option<Vec<ElementRef<'_>>>) -> Vec<String> {
    match nodes {
        Some(nodes) => nodes.into_iter().map(|el| text_of(Some(el), SENTINEL)).collect(),
        None => vec![SENTINEL.to_string()],
    }
}
