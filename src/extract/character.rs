use super::fields;
use super::rules::{self, card, form, Stat, CARD_LAYOUT, FORM_LAYOUT};
use super::Scope;
use crate::dom;
use crate::models::{Character, Transformation};
use scraper::Html;

/// Parse a character page and extract its record.
///
/// Returns `None` for blank input or a page without a character table.
pub fn extract_character_page(html: &str) -> Option<Character> {
    let document = dom::parse_html(html)?;
    extract_character(&document)
}

/// Extract the full character record from a parsed page.
pub fn extract_character(document: &Html) -> Option<Character> {
    let page = Scope::page(document);
    if page.query(rules::PRIMARY_TABLE).is_none() {
        log::warn!("No character table found on page");
        return None;
    }

    let (class, char_type) = fields::class_and_type(&page, &CARD_LAYOUT);
    let image_url = fields::image_url(&page, &CARD_LAYOUT);
    let full_image_url = fields::full_image_url(&image_url);
    let hp = fields::stat_line(&page, Stat::Hp);
    let attack = fields::stat_line(&page, Stat::Attack);
    let defence = fields::stat_line(&page, Stat::Defence);
    let ki_multiplier = fields::ki_multiplier(&page);
    let ki_cell = fields::ki_multiplier_cell(&page);
    let ki_at = |ki| {
        ki_cell
            .as_deref()
            .and_then(|html| fields::ki_multiplier_at(html, ki))
    };
    let (ki12_multiplier, ki18_multiplier, ki24_multiplier) = (ki_at(12), ki_at(18), ki_at(24));

    let character = Character {
        name: fields::name(&page, &CARD_LAYOUT),
        title: fields::title(&page, &CARD_LAYOUT),
        max_level: fields::max_level(&page),
        max_sa_level: fields::max_sa_level(&page),
        rarity: fields::rarity(&page),
        class,
        char_type,
        cost: fields::cost(&page),
        id: fields::card_id(&page, &CARD_LAYOUT),
        image_url,
        full_image_url,

        leader_skill: card::LEADER_SKILL.required(&page).into_required(),
        eza_leader_skill: card::EZA_LEADER_SKILL.optional(&page).into_optional(),
        seza_leader_skill: card::SEZA_LEADER_SKILL.optional(&page).into_optional(),

        super_attack: card::SUPER_ATTACK.required(&page).into_required(),
        eza_super_attack: card::EZA_SUPER_ATTACK.optional(&page).into_optional(),
        seza_super_attack: card::SEZA_SUPER_ATTACK.optional(&page).into_optional(),

        ultra_super_attack: card::ULTRA_SUPER_ATTACK.optional(&page).into_optional(),
        eza_ultra_super_attack: card::EZA_ULTRA_SUPER_ATTACK.optional(&page).into_optional(),
        seza_ultra_super_attack: card::SEZA_ULTRA_SUPER_ATTACK.optional(&page).into_optional(),

        passive: card::PASSIVE.required(&page).into_required(),
        eza_passive: card::EZA_PASSIVE.optional(&page).into_optional(),
        seza_passive: card::SEZA_PASSIVE.optional(&page).into_optional(),

        active_skill: card::ACTIVE_SKILL.optional(&page).into_optional(),
        active_skill_condition: card::ACTIVE_SKILL_CONDITION.optional(&page).into_optional(),
        eza_active_skill: card::EZA_ACTIVE_SKILL.optional(&page).into_optional(),
        eza_active_skill_condition: card::EZA_ACTIVE_SKILL_CONDITION
            .optional(&page)
            .into_optional(),
        seza_active_skill: card::SEZA_ACTIVE_SKILL.optional(&page).into_optional(),
        seza_active_skill_condition: card::SEZA_ACTIVE_SKILL_CONDITION
            .optional(&page)
            .into_optional(),

        transformation_condition: card::TRANSFORMATION_CONDITION.optional(&page).into_optional(),

        links: fields::list(&page, &rules::LINKS),
        categories: fields::list(&page, &rules::CATEGORIES),
        ki_meter: fields::list(&page, &rules::KI_METER),

        base_hp: hp.base,
        max_level_hp: hp.max_level,
        free_dupe_hp: hp.free_dupe,
        rainbow_hp: hp.rainbow,
        base_attack: attack.base,
        max_level_attack: attack.max_level,
        free_dupe_attack: attack.free_dupe,
        rainbow_attack: attack.rainbow,
        base_defence: defence.base,
        max_level_defence: defence.max_level,
        free_dupe_defence: defence.free_dupe,
        rainbow_defence: defence.rainbow,

        ki_multiplier,
        ki12_multiplier,
        ki18_multiplier,
        ki24_multiplier,

        transformations: transformations(document),
    };

    log::debug!("Extracted character {} ({})", character.name, character.id);
    Some(character)
}

/// Alternate forms from the card's tabber.
///
/// The first tab is the base form itself, so `n` tabs give `n - 1` forms and a
/// page with at most one tab has none.
pub fn transformations(document: &Html) -> Option<Vec<Transformation>> {
    let tabs = Scope::page(document)
        .query_all(rules::FORM_TABS)
        .map_or(0, |tabs| tabs.len());
    if tabs <= 1 {
        return None;
    }

    let forms = (0..tabs - 1)
        .map(|index| {
            let root = rules::form_root(index);
            transformation(&Scope::within(document, &root))
        })
        .collect();
    Some(forms)
}

fn transformation(scope: &Scope<'_, '_>) -> Transformation {
    let (class, char_type) = fields::class_and_type(scope, &FORM_LAYOUT);
    let image_url = fields::image_url(scope, &FORM_LAYOUT);
    let full_image_url = fields::full_image_url(&image_url);

    Transformation {
        id: fields::card_id(scope, &FORM_LAYOUT),
        name: fields::name(scope, &FORM_LAYOUT),
        class,
        char_type,

        super_attack: form::SUPER_ATTACK.required(scope).into_required(),
        eza_super_attack: form::EZA_SUPER_ATTACK.optional(scope).into_optional(),
        seza_super_attack: form::SEZA_SUPER_ATTACK.optional(scope).into_optional(),

        ultra_super_attack: form::ULTRA_SUPER_ATTACK.optional(scope).into_optional(),
        eza_ultra_super_attack: form::EZA_ULTRA_SUPER_ATTACK.optional(scope).into_optional(),
        seza_ultra_super_attack: form::SEZA_ULTRA_SUPER_ATTACK.optional(scope).into_optional(),

        passive: form::PASSIVE.required(scope).into_required(),
        eza_passive: form::EZA_PASSIVE.optional(scope).into_optional(),
        seza_passive: form::SEZA_PASSIVE.optional(scope).into_optional(),

        active_skill: form::ACTIVE_SKILL.optional(scope).into_optional(),
        active_skill_condition: form::ACTIVE_SKILL_CONDITION.optional(scope).into_optional(),

        links: fields::list(scope, &rules::LINKS),
        image_url,
        full_image_url,
    }
}

