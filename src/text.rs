//! Cleaning helpers for wiki markup fragments.
//!
//! All functions are pure and never fail: unusable input maps to the
//! [`SENTINEL`] string or to the caller's numeric fallback.

use crate::models::SENTINEL;
use regex::Regex;
use std::sync::LazyLock;

static BASIC_EFFECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Basic effect\(s\)-?\s*").expect("basic effect regex"));
static DASH_CLAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+-\s+").expect("dash clause regex"));
static DASH_BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\s+").expect("dash bullet regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex"));
static SEMICOLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*;[\s;]*").expect("semicolon regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag regex"));

/// Normalize passive skill text into `"clause; clause; clause"` form.
///
/// Applied to every passive of every tier, including transformations.
/// Idempotent: cleaning already-clean text returns it unchanged.
pub fn clean_passive_text(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return SENTINEL.to_string();
    };

    // A single pass can expose a new pattern (e.g. removing a bullet dash
    // next to another dash), so run to a fixpoint.
    let mut current = raw.to_string();
    for _ in 0..32 {
        let next = clean_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    if current.is_empty() {
        SENTINEL.to_string()
    } else {
        current
    }
}

fn clean_pass(text: &str) -> String {
    let mut s = text.to_string();
    while BASIC_EFFECT_RE.is_match(&s) {
        s = BASIC_EFFECT_RE.replace_all(&s, "").into_owned();
    }
    let s = s.replace('\n', ";");
    let s = DASH_CLAUSE_RE.replace_all(&s, ";");
    let s = DASH_BULLET_RE.replace_all(&s, " ");
    let s = WHITESPACE_RE.replace_all(&s, " ");
    let s = SEMICOLON_RE.replace_all(&s, "; ");
    s.trim_matches(|c: char| c == ';' || c.is_whitespace()).to_string()
}

/// Remove every tag from a markup fragment.
pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

fn unescape(s: &str) -> String {
    s.replace("&nbsp;", " ").replace("&amp;", "&")
}

/// Character name from the card's `Title<br>Name` header cell.
///
/// The name is whatever follows the first `<br>`, up to the closing bold tag.
pub fn extract_name(html: Option<&str>) -> String {
    let Some((_, after)) = html.and_then(|h| h.split_once("<br>")) else {
        return SENTINEL.to_string();
    };
    let name = after.split("</b>").next().unwrap_or(after);
    non_empty(unescape(&strip_tags(name)))
}

/// Character title from the card's `Title<br>Name` header cell.
///
/// The title sits between the opening bold tag and the first `<br>`.
pub fn extract_title(html: Option<&str>) -> String {
    let Some((before, _)) = html.and_then(|h| h.split_once("<br>")) else {
        return SENTINEL.to_string();
    };
    let title = before.split_once("<b>").map(|(_, t)| t).unwrap_or(before);
    non_empty(unescape(&strip_tags(title)))
}

fn non_empty(s: String) -> String {
    let s = s.trim();
    if s.is_empty() {
        SENTINEL.to_string()
    } else {
        s.to_string()
    }
}

/// Parse the leading integer of `text`, ignoring anything after it.
///
/// `"150"` and `"150 (max)"` both give 150; empty or non-numeric text gives
/// `fallback`.
pub fn safe_parse_int(text: Option<&str>, fallback: i64) -> i64 {
    let Some(text) = text else {
        return fallback;
    };
    let t = text.trim_start();
    let (sign, digits) = match t.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, t.strip_prefix('+').unwrap_or(t)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end]
        .parse::<i64>()
        .map(|n| sign * n)
        .unwrap_or(fallback)
}
