//! Extraction engine for character pages.
//!
//! The wiki has no schema, only layout. Each field is described by a small
//! rule (which icon anchors the section, where to look for it, how far to
//! walk from the header row) and [`resolve`] interprets those rules against a
//! document. The rule tables themselves live in [`rules`].

pub mod character;
pub mod fields;
pub mod rules;

pub use character::{extract_character, extract_character_page};

use crate::dom;
use crate::models::SENTINEL;
use crate::text::clean_passive_text;
use scraper::{ElementRef, Html};

/// Result of one field lookup before it is collapsed into the record.
///
/// Required fields become `Present` or `Sentinel`; optional fields become
/// `Present` or `Absent`. Only [`FieldValue::into_required`] and
/// [`FieldValue::into_optional`] turn these into the record's string/omission
/// form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Present(String),
    Sentinel,
    Absent,
}

impl FieldValue {
    pub fn required(value: Option<String>) -> Self {
        value.map_or(FieldValue::Sentinel, FieldValue::Present)
    }

    pub fn optional(value: Option<String>) -> Self {
        value.map_or(FieldValue::Absent, FieldValue::Present)
    }

    pub fn into_required(self) -> String {
        match self {
            FieldValue::Present(s) => s,
            FieldValue::Sentinel | FieldValue::Absent => SENTINEL.to_string(),
        }
    }

    pub fn into_optional(self) -> Option<String> {
        match self {
            FieldValue::Present(s) => Some(s),
            FieldValue::Sentinel | FieldValue::Absent => None,
        }
    }
}

/// Where extraction is rooted: the whole page, or one form tab under a CSS prefix.
#[derive(Debug, Clone, Copy)]
pub struct Scope<'a, 'p> {
    pub root: ElementRef<'a>,
    pub prefix: &'p str,
}

impl<'a, 'p> Scope<'a, 'p> {
    pub fn page(document: &'a Html) -> Self {
        Scope {
            root: document.root_element(),
            prefix: "",
        }
    }

    pub fn within(document: &'a Html, prefix: &'p str) -> Self {
        Scope {
            root: document.root_element(),
            prefix,
        }
    }

    /// Prefix `rest` with this scope's root selector.
    pub fn css(&self, rest: &str) -> String {
        if self.prefix.is_empty() {
            rest.to_string()
        } else {
            format!("{} {}", self.prefix, rest)
        }
    }

    pub fn query(&self, rest: &str) -> Option<ElementRef<'a>> {
        dom::query(Some(self.root), &self.css(rest))
    }

    pub fn query_all(&self, rest: &str) -> Option<Vec<ElementRef<'a>>> {
        dom::query_all(Some(self.root), &self.css(rest))
    }
}

/// Where a rule looks for its section header.
#[derive(Debug, Clone, Copy)]
pub enum Locator {
    /// First icon-tagged header anywhere in scope.
    Icon,
    /// The header inside the n-th `table.ezawidth` (0 = base copy, 1 = EZA, 2 = SEZA).
    TierTable(usize),
    /// First header under a CSS container, relative to scope.
    Within(&'static str),
    /// A cell whose own text is the value; no row walk.
    Cell(&'static str),
}

/// How the value is read once the header is found.
#[derive(Debug, Clone, Copy)]
pub enum Read {
    /// Text of the row right after the header row.
    NextRow,
    /// As `NextRow`, trying the row after that when the first is empty.
    NextRowOrSecond,
    /// First `td > center` text in up to n rows past the row after the header.
    ConditionWithin(usize),
    /// `td > center` text of the row right after the header row.
    NextRowCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clean {
    Raw,
    Passive,
}

/// One text field of a card, described by its icon anchor and fallbacks.
#[derive(Debug, Clone, Copy)]
pub struct SkillRule {
    pub icon: &'static str,
    /// Tried in order; the first that yields usable text wins.
    pub candidates: &'static [Locator],
    pub read: Read,
    pub clean: Clean,
}

impl SkillRule {
    pub fn required(&self, scope: &Scope<'_, '_>) -> FieldValue {
        FieldValue::required(resolve(self, scope))
    }

    pub fn optional(&self, scope: &Scope<'_, '_>) -> FieldValue {
        FieldValue::optional(resolve(self, scope))
    }
}

/// Text counts as extracted only when it is non-empty and not the sentinel.
pub(crate) fn usable(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty() && t != SENTINEL)
}

/// Run a rule against a scope, returning the first usable text.
pub fn resolve(rule: &SkillRule, scope: &Scope<'_, '_>) -> Option<String> {
    for locator in rule.candidates {
        let raw = match locator {
            Locator::Cell(css) => usable(dom::text(scope.query(css))),
            _ => locate(rule.icon, *locator, scope).and_then(|header| read(header, rule.read)),
        };
        let value = match (raw, rule.clean) {
            (Some(text), Clean::Passive) => usable(Some(clean_passive_text(Some(&text)))),
            (raw, _) => raw,
        };
        if value.is_some() {
            return value;
        }
    }
    log::trace!("No value for {} in scope {:?}", rule.icon, scope.prefix);
    None
}

fn locate<'a>(icon: &str, locator: Locator, scope: &Scope<'a, '_>) -> Option<ElementRef<'a>> {
    let icon_sel = dom::image_name_selector(icon);
    match locator {
        Locator::Icon => scope.query(&icon_sel),
        Locator::TierTable(index) => {
            let tables = scope.query_all("table.ezawidth")?;
            let table = tables.get(index).copied()?;
            dom::find_by_image_name(Some(table), icon)
        }
        Locator::Within(container) => scope.query(&format!("{} {}", container, icon_sel)),
        Locator::Cell(_) => None,
    }
}

fn read(header: ElementRef<'_>, mode: Read) -> Option<String> {
    let row = dom::closest(Some(header), "tr");
    let next = dom::next_sibling(row);
    match mode {
        Read::NextRow => usable(dom::text(next)),
        Read::NextRowOrSecond => {
            usable(dom::text(next)).or_else(|| usable(dom::text(dom::next_sibling(next))))
        }
        Read::ConditionWithin(hops) => {
            let mut current = next;
            for _ in 0..hops {
                current = dom::next_sibling(current);
                if current.is_none() {
                    break;
                }
                if let Some(text) = usable(dom::text(dom::query(current, "td > center"))) {
                    return Some(text);
                }
            }
            None
        }
        Read::NextRowCenter => usable(dom::text(dom::query(next, "td > center"))),
    }
}
