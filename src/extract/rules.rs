//! Declarative field descriptors for character cards.
//!
//! Every skill field of the base card and of each form tab is one
//! [`SkillRule`]. Tiered fields list their locators in priority order: the
//! indexed `table.ezawidth` first, then the older class-based containers.

use super::{Clean, Locator, Read, SkillRule};

pub const LEADER_SKILL_ICON: &str = "Leader Skill.png";
pub const SUPER_ATTACK_ICON: &str = "Super atk.png";
pub const ULTRA_SUPER_ATTACK_ICON: &str = "Ultra Super atk.png";
pub const PASSIVE_ICON: &str = "Passive skill.png";
pub const ACTIVE_SKILL_ICON: &str = "Active skill.png";
pub const ACTIVATION_CONDITION_ICON: &str = "Activation Condition.png";
pub const TRANSFORMATION_CONDITION_ICON: &str = "Transformation Condition.png";
pub const LINK_SKILL_ICON: &str = "Link skill.png";
pub const CATEGORY_ICON: &str = "Category.png";
pub const KI_METER_ICON: &str = "Ki meter.png";

const EZA: usize = 1;
const SEZA: usize = 2;

const EZA_CONTAINER: &str = ".ezawidth";
const SEZA_CONTAINER: &str = ".super-eza";
const EZA_LEADER_CELL: &str = ".ezatabber > div > div:nth-child(3) > table > tbody > tr:nth-child(2) > td";
const EZA_TAB: &str = ".righttablecard > table > tbody > tr > td > div > div > div:nth-child(3)";
const SEZA_TAB: &str = ".righttablecard > table > tbody > tr > td > div > div > div:nth-child(4)";

const BASE: &[Locator] = &[Locator::Icon];
const EZA_TIER: &[Locator] = &[Locator::TierTable(EZA), Locator::Within(EZA_CONTAINER)];
const SEZA_TIER: &[Locator] = &[Locator::TierTable(SEZA), Locator::Within(SEZA_CONTAINER)];
const EZA_LEADER: &[Locator] = &[
    Locator::Cell(EZA_LEADER_CELL),
    Locator::TierTable(EZA),
    Locator::Within(EZA_CONTAINER),
];
const EZA_ULTRA: &[Locator] = &[
    Locator::TierTable(EZA),
    Locator::Within(EZA_TAB),
    Locator::Within(EZA_CONTAINER),
];
const FORM_EZA_TIER: &[Locator] = &[
    Locator::Within(EZA_TAB),
    Locator::TierTable(EZA),
    Locator::Within(EZA_CONTAINER),
];
const FORM_SEZA_TIER: &[Locator] = &[
    Locator::Within(SEZA_TAB),
    Locator::TierTable(SEZA),
    Locator::Within(SEZA_CONTAINER),
];

const fn text(icon: &'static str, candidates: &'static [Locator]) -> SkillRule {
    SkillRule {
        icon,
        candidates,
        read: Read::NextRow,
        clean: Clean::Raw,
    }
}

const fn passive(candidates: &'static [Locator]) -> SkillRule {
    SkillRule {
        icon: PASSIVE_ICON,
        candidates,
        read: Read::NextRow,
        clean: Clean::Passive,
    }
}

const fn condition(icon: &'static str, candidates: &'static [Locator]) -> SkillRule {
    SkillRule {
        icon,
        candidates,
        read: Read::ConditionWithin(3),
        clean: Clean::Raw,
    }
}

/// Skill rules for the base card and its EZA / SEZA tiers.
pub mod card {
    use super::*;

    pub const LEADER_SKILL: SkillRule = text(LEADER_SKILL_ICON, BASE);
    pub const EZA_LEADER_SKILL: SkillRule = text(LEADER_SKILL_ICON, EZA_LEADER);
    pub const SEZA_LEADER_SKILL: SkillRule = text(LEADER_SKILL_ICON, SEZA_TIER);

    pub const SUPER_ATTACK: SkillRule = text(SUPER_ATTACK_ICON, BASE);
    pub const EZA_SUPER_ATTACK: SkillRule = text(SUPER_ATTACK_ICON, EZA_TIER);
    pub const SEZA_SUPER_ATTACK: SkillRule = text(SUPER_ATTACK_ICON, SEZA_TIER);

    pub const ULTRA_SUPER_ATTACK: SkillRule = text(ULTRA_SUPER_ATTACK_ICON, BASE);
    pub const EZA_ULTRA_SUPER_ATTACK: SkillRule = text(ULTRA_SUPER_ATTACK_ICON, EZA_ULTRA);
    pub const SEZA_ULTRA_SUPER_ATTACK: SkillRule = text(ULTRA_SUPER_ATTACK_ICON, SEZA_TIER);

    pub const PASSIVE: SkillRule = passive(BASE);
    pub const EZA_PASSIVE: SkillRule = passive(EZA_TIER);
    pub const SEZA_PASSIVE: SkillRule = passive(SEZA_TIER);

    pub const ACTIVE_SKILL: SkillRule = SkillRule {
        read: Read::NextRowOrSecond,
        ..text(ACTIVE_SKILL_ICON, BASE)
    };
    pub const EZA_ACTIVE_SKILL: SkillRule = text(ACTIVE_SKILL_ICON, EZA_TIER);
    pub const SEZA_ACTIVE_SKILL: SkillRule = text(ACTIVE_SKILL_ICON, SEZA_TIER);

    pub const ACTIVE_SKILL_CONDITION: SkillRule = condition(ACTIVE_SKILL_ICON, BASE);
    pub const EZA_ACTIVE_SKILL_CONDITION: SkillRule = condition(ACTIVE_SKILL_ICON, EZA_TIER);
    pub const SEZA_ACTIVE_SKILL_CONDITION: SkillRule = condition(ACTIVE_SKILL_ICON, SEZA_TIER);

    pub const TRANSFORMATION_CONDITION: SkillRule = SkillRule {
        read: Read::NextRowCenter,
        ..text(TRANSFORMATION_CONDITION_ICON, BASE)
    };
}

/// Skill rules applied inside one form tab.
pub mod form {
    use super::*;

    pub const SUPER_ATTACK: SkillRule = text(SUPER_ATTACK_ICON, BASE);
    pub const EZA_SUPER_ATTACK: SkillRule = text(SUPER_ATTACK_ICON, FORM_EZA_TIER);
    pub const SEZA_SUPER_ATTACK: SkillRule = text(SUPER_ATTACK_ICON, FORM_SEZA_TIER);

    pub const ULTRA_SUPER_ATTACK: SkillRule = text(ULTRA_SUPER_ATTACK_ICON, BASE);
    pub const EZA_ULTRA_SUPER_ATTACK: SkillRule = text(ULTRA_SUPER_ATTACK_ICON, FORM_EZA_TIER);
    pub const SEZA_ULTRA_SUPER_ATTACK: SkillRule = text(ULTRA_SUPER_ATTACK_ICON, FORM_SEZA_TIER);

    pub const PASSIVE: SkillRule = passive(BASE);
    pub const EZA_PASSIVE: SkillRule = passive(FORM_EZA_TIER);
    pub const SEZA_PASSIVE: SkillRule = passive(FORM_SEZA_TIER);

    pub const ACTIVE_SKILL: SkillRule = text(ACTIVE_SKILL_ICON, BASE);
    pub const ACTIVE_SKILL_CONDITION: SkillRule = text(ACTIVATION_CONDITION_ICON, BASE);
}

/// Selectors for the identity block of a card table.
#[derive(Debug, Clone, Copy)]
pub struct CardLayout {
    /// Cell holding `Title<br>Name`.
    pub header: &'static str,
    /// Anchor whose `title` is `Category:<Class> <Type>`.
    pub class_type: &'static str,
    pub id: &'static str,
    /// Thumbnail candidates, tried in order.
    pub images: &'static [&'static str],
}

pub const CARD_LAYOUT: CardLayout = CardLayout {
    header: ".mw-parser-output table > tbody > tr > td:nth-child(2)",
    class_type: ".mw-parser-output table > tbody > tr:nth-child(3) > td:nth-child(4) > center a",
    id: ".mw-parser-output table > tbody > tr:nth-child(3) > td:nth-child(6) > center:nth-child(1)",
    images: &[
        ".mw-parser-output table > tbody > tr > td > div > img",
        ".mw-parser-output table > tbody > tr > td > a",
        ".mw-parser-output table > tbody > tr > td > img",
    ],
};

/// Form tabs are addressed relative to the tab's own root selector.
pub const FORM_LAYOUT: CardLayout = CardLayout {
    header: "> table > tbody > tr > td:nth-child(2)",
    class_type: "> table > tbody > tr:nth-child(3) > td:nth-child(4) > center > a",
    id: "> table > tbody > tr:nth-child(3) > td:nth-child(6)",
    images: &[
        "> table > tbody > tr > td > div > img",
        "> table > tbody > tr > td > a",
        "> table > tbody > tr > td > img",
    ],
};

pub const PRIMARY_TABLE: &str = ".mw-parser-output table";
pub const MAX_LEVEL: &str = ".mw-parser-output table > tbody > tr:nth-child(3) > td";
pub const MAX_SA_LEVEL: &str = ".mw-parser-output table > tbody > tr:nth-child(3) > td:nth-child(2) > center";
pub const RARITY: &str = ".mw-parser-output table > tbody > tr:nth-child(3) > td:nth-child(3) > center a";
pub const COST: &str = ".mw-parser-output table > tbody > tr:nth-child(3) > td:nth-child(5) > center:nth-child(1)";

pub const KI_MULTIPLIER_CELL: &str =
    ".righttablecard > table:nth-child(6) > tbody:nth-child(1) > tr:nth-child(2) > td:nth-child(1)";
pub const RIGHT_CARD: &str = ".righttablecard";

pub const FORM_TABS: &str = ".mw-parser-output > div:nth-child(2) > div > ul > li";

/// Root selector of the form tab at zero-based `index`.
///
/// Form panels follow the tab list inside the tabber, so the first form is
/// the tabber's second child.
pub fn form_root(index: usize) -> String {
    format!(".mw-parser-output > div:nth-child(2) > div:nth-child({})", index + 2)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Hp,
    Attack,
    Defence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatColumn {
    Base,
    MaxLevel,
    FreeDupe,
    Rainbow,
}

impl Stat {
    fn row(self) -> usize {
        match self {
            Stat::Hp => 2,
            Stat::Attack => 3,
            Stat::Defence => 4,
        }
    }
}

impl StatColumn {
    fn column(self) -> usize {
        match self {
            StatColumn::Base => 2,
            StatColumn::MaxLevel => 3,
            StatColumn::FreeDupe => 4,
            StatColumn::Rainbow => 5,
        }
    }
}

/// Cell selector of one stat in the card's stat table.
pub fn stat_cell(stat: Stat, column: StatColumn) -> String {
    format!(
        ".righttablecard > table:nth-child(3) > tbody:nth-child(1) > tr:nth-child({}) > td:nth-child({}) > center:nth-child(1)",
        stat.row(),
        column.column()
    )
}

/// How a list field finds its container relative to the header icon.
#[derive(Debug, Clone, Copy)]
pub enum ListContainer {
    NextRow,
    Closest(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub enum ListItem {
    /// Trimmed text of each item.
    Text,
    /// Each item's `alt` up to `.png`.
    AltStem,
}

#[derive(Debug, Clone, Copy)]
pub struct ListRule {
    pub icon: &'static str,
    pub container: ListContainer,
    pub items: &'static str,
    pub item: ListItem,
    /// Leading items that belong to the header itself.
    pub skip: usize,
    /// Whether an empty result means the section is missing.
    pub empty_is_absent: bool,
}

pub const LINKS: ListRule = ListRule {
    icon: LINK_SKILL_ICON,
    container: ListContainer::NextRow,
    items: "span > a",
    item: ListItem::Text,
    skip: 0,
    empty_is_absent: false,
};

pub const CATEGORIES: ListRule = ListRule {
    icon: CATEGORY_ICON,
    container: ListContainer::NextRow,
    items: "a",
    item: ListItem::Text,
    skip: 0,
    empty_is_absent: false,
};

pub const KI_METER: ListRule = ListRule {
    icon: KI_METER_ICON,
    container: ListContainer::Closest("tbody"),
    items: "img",
    item: ListItem::AltStem,
    skip: 1,
    empty_is_absent: true,
};
