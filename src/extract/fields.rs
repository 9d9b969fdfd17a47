//! Extractors for the non-skill parts of a card: identity, stats, lists,
//! ki data and artwork.

use super::rules::{self, CardLayout, ListContainer, ListItem, ListRule, Stat, StatColumn};
use super::{usable, Scope};
use crate::dom;
use crate::models::{Class, Rarity, Type, SENTINEL};
use crate::text::{extract_name, extract_title, safe_parse_int};
use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

static SA_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a\b[^>]*title="Super Attack Multipliers"[^>]*>(.*?)</a>"#)
        .expect("SA multiplier link regex")
});
static KI_MULTIPLIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*Ki\s*Multiplier[^0-9]*([0-9.]+)").expect("ki multiplier regex")
});

const KI_BULLET: &str = "► ";
const CATEGORY_PREFIX: &str = "Category:";

pub fn name(scope: &Scope<'_, '_>, layout: &CardLayout) -> String {
    let html = scope.query(layout.header).map(|el| el.inner_html());
    extract_name(html.as_deref())
}

pub fn title(scope: &Scope<'_, '_>, layout: &CardLayout) -> String {
    let html = scope.query(layout.header).map(|el| el.inner_html());
    extract_title(html.as_deref())
}

fn category_title(el: Option<ElementRef<'_>>) -> Option<String> {
    let title = el?.value().attr("title")?;
    let value = title.split_once(CATEGORY_PREFIX).map_or(title, |(_, v)| v);
    Some(value.trim().to_string())
}

/// Class and type share one anchor titled `Category:<Class> <Type>`.
pub fn class_and_type(scope: &Scope<'_, '_>, layout: &CardLayout) -> (Class, Type) {
    let value = category_title(scope.query(layout.class_type)).unwrap_or_default();
    let mut parts = value.split_whitespace();
    let class = Class::parse(parts.next().unwrap_or(""));
    let char_type = Type::parse(parts.next().unwrap_or(""));
    (class, char_type)
}

pub fn rarity(scope: &Scope<'_, '_>) -> Rarity {
    Rarity::parse(&category_title(scope.query(rules::RARITY)).unwrap_or_default())
}

pub fn card_id(scope: &Scope<'_, '_>, layout: &CardLayout) -> String {
    usable(dom::text(scope.query(layout.id))).unwrap_or_else(|| SENTINEL.to_string())
}

/// Level cell reads `current/max`; a bare number is taken as the max.
pub fn max_level(scope: &Scope<'_, '_>) -> i64 {
    let text = dom::text_of(scope.query(rules::MAX_LEVEL), "");
    let mut parts = text.split('/');
    let first = parts.next();
    let level = parts.next().or(first);
    safe_parse_int(level, 0)
}

pub fn max_sa_level(scope: &Scope<'_, '_>) -> String {
    let text = dom::text(scope.query(rules::MAX_SA_LEVEL));
    let value = text.map(|t| match t.split_once('/') {
        Some((_, max)) => max.trim().to_string(),
        None => t,
    });
    usable(value).unwrap_or_else(|| SENTINEL.to_string())
}

pub fn cost(scope: &Scope<'_, '_>) -> i64 {
    safe_parse_int(dom::text(scope.query(rules::COST)).as_deref(), 0)
}

/// One row of the stat table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatLine {
    pub base: i64,
    pub max_level: i64,
    pub free_dupe: i64,
    pub rainbow: i64,
}

pub fn stat_line(scope: &Scope<'_, '_>, stat: Stat) -> StatLine {
    let cell = |column| {
        let text = dom::text(scope.query(&rules::stat_cell(stat, column)));
        safe_parse_int(text.as_deref(), 0)
    };
    StatLine {
        base: cell(StatColumn::Base),
        max_level: cell(StatColumn::MaxLevel),
        free_dupe: cell(StatColumn::FreeDupe),
        rainbow: cell(StatColumn::Rainbow),
    }
}

/// Collect a list section.
///
/// A missing header or container gives `["Error"]`. A container with no
/// items gives an empty list unless the rule treats that as missing too.
pub fn list(scope: &Scope<'_, '_>, rule: &ListRule) -> Vec<String> {
    let header = scope.query(&dom::image_name_selector(rule.icon));
    let container = match rule.container {
        ListContainer::NextRow => dom::next_sibling(dom::closest(header, "tr")),
        ListContainer::Closest(css) => dom::closest(header, css),
    };
    let Some(items) = dom::query_all(container, rule.items) else {
        return vec![SENTINEL.to_string()];
    };
    let values: Vec<String> = items
        .into_iter()
        .skip(rule.skip)
        .map(|el| match rule.item {
            ListItem::Text => dom::text_of(Some(el), SENTINEL),
            ListItem::AltStem => el
                .value()
                .attr("alt")
                .map(|alt| alt.split(".png").next().unwrap_or(alt).to_string())
                .unwrap_or_else(|| SENTINEL.to_string()),
        })
        .collect();

    if values.is_empty() && rule.empty_is_absent {
        vec![SENTINEL.to_string()]
    } else {
        values
    }
}

/// Inner markup of the multiplier cell in the right-hand card column.
pub fn ki_multiplier_cell(scope: &Scope<'_, '_>) -> Option<String> {
    scope.query(rules::KI_MULTIPLIER_CELL).map(|cell| cell.inner_html())
}

/// Ki multiplier summary, e.g. `"12 Ki Multiplier is 150%; 24 Ki Multiplier is 200%"`.
pub fn ki_multiplier(scope: &Scope<'_, '_>) -> String {
    if let Some(html) = ki_multiplier_cell(scope) {
        let joined = ki_segments(&html).join("; ");
        if !joined.is_empty() {
            return joined;
        }
    }

    // Older cards keep the multiplier table right after the card column.
    let sibling = dom::next_sibling(scope.query(rules::RIGHT_CARD));
    let text = dom::text(dom::query(sibling, "tr:nth-child(2) > td"));
    let fallback = text.and_then(|t| t.split(KI_BULLET).nth(1).map(|s| s.trim().to_string()));
    usable(fallback).unwrap_or_else(|| SENTINEL.to_string())
}

/// Bulleted segments of the multiplier cell, each cut at its line break.
pub fn ki_segments(html: &str) -> Vec<String> {
    html.split(KI_BULLET)
        .skip(1)
        .filter_map(|segment| {
            let line = segment.split("<br>").next().unwrap_or(segment);
            let line = SA_LINK_RE.replace_all(line, "$1");
            let line = line.trim();
            (!line.is_empty()).then(|| line.to_string())
        })
        .collect()
}

/// Multiplier for a given ki level in the cell markup, e.g.
/// `ki_multiplier_at(html, 12) == Some("150")`.
///
/// Reads the cell directly, so it works whether or not the cell is bulleted.
pub fn ki_multiplier_at(cell_html: &str, ki: u32) -> Option<String> {
    let ki = ki.to_string();
    KI_MULTIPLIER_RE
        .captures_iter(cell_html)
        .find(|caps| &caps[1] == ki)
        .map(|caps| caps[2].trim_end_matches('.').to_string())
}

fn image_source(el: ElementRef<'_>) -> Option<String> {
    let attrs = el.value();
    let src = match (attrs.attr("src"), attrs.attr("data-src")) {
        // Lazy-loaded thumbnails carry a data URI placeholder in `src`.
        (Some(src), Some(lazy)) if src.starts_with("data:") => Some(lazy),
        (Some(src), _) => Some(src),
        (None, lazy) => lazy,
    };
    usable(src.or_else(|| attrs.attr("href")).map(|s| s.trim().to_string()))
}

pub fn image_url(scope: &Scope<'_, '_>, layout: &CardLayout) -> String {
    layout
        .images
        .iter()
        .filter_map(|css| scope.query(css))
        .find_map(image_source)
        .unwrap_or_else(|| SENTINEL.to_string())
}

/// Full-size artwork URL: the thumbnail URL without the `thumb_` marker in
/// its file name. Directories, the `/revision/...` suffix and the query
/// string are left alone.
pub fn full_image_url(thumb: &str) -> String {
    if thumb == SENTINEL {
        return SENTINEL.to_string();
    }
    let name_end = [thumb.find("/revision"), thumb.find('?')]
        .into_iter()
        .flatten()
        .min()
        .unwrap_or(thumb.len());
    let name_start = thumb[..name_end].rfind('/').map_or(0, |i| i + 1);
    format!(
        "{}{}{}",
        &thumb[..name_start],
        thumb[name_start..name_end].replacen("thumb_", "", 1),
        &thumb[name_end..]
    )
}
