use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder stored in required fields the page did not provide.
///
/// Downstream consumers test for this exact string, so it is part of the
/// record format.
pub const SENTINEL: &str = "Error";

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rarity {
    N,
    R,
    SR,
    SSR,
    UR,
    LR,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    Super,
    Extreme,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    PHY,
    STR,
    AGL,
    TEQ,
    INT,
}

impl Rarity {
    /// Unrecognised values fall back to `UR`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "N" => Rarity::N,
            "R" => Rarity::R,
            "SR" => Rarity::SR,
            "SSR" => Rarity::SSR,
            "LR" => Rarity::LR,
            _ => Rarity::UR,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::N => "N",
            Rarity::R => "R",
            Rarity::SR => "SR",
            Rarity::SSR => "SSR",
            Rarity::UR => "UR",
            Rarity::LR => "LR",
        }
    }
}

impl Class {
    /// Unrecognised values fall back to `Super`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Extreme" => Class::Extreme,
            _ => Class::Super,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Class::Super => "Super",
            Class::Extreme => "Extreme",
        }
    }
}

impl Type {
    /// Unrecognised values fall back to `PHY`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "STR" => Type::STR,
            "AGL" => Type::AGL,
            "TEQ" => Type::TEQ,
            "INT" => Type::INT,
            _ => Type::PHY,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Type::PHY => "PHY",
            Type::STR => "STR",
            Type::AGL => "AGL",
            Type::TEQ => "TEQ",
            Type::INT => "INT",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One character card from the wiki.
///
/// Required text fields hold either extracted text or [`SENTINEL`]. Optional
/// fields are omitted from the serialized record when the page lacks them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub title: String,
    pub max_level: i64,
    #[serde(rename = "maxSALevel")]
    pub max_sa_level: String,
    pub rarity: Rarity,
    pub class: Class,
    #[serde(rename = "type")]
    pub char_type: Type,
    pub cost: i64,
    pub id: String,
    #[serde(rename = "imageURL")]
    pub image_url: String,
    #[serde(rename = "fullImageURL")]
    pub full_image_url: String,

    pub leader_skill: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eza_leader_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seza_leader_skill: Option<String>,

    pub super_attack: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eza_super_attack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seza_super_attack: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ultra_super_attack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eza_ultra_super_attack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seza_ultra_super_attack: Option<String>,

    pub passive: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eza_passive: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seza_passive: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_skill_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eza_active_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eza_active_skill_condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seza_active_skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seza_active_skill_condition: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation_condition: Option<String>,

    pub links: Vec<String>,
    pub categories: Vec<String>,
    pub ki_meter: Vec<String>,

    #[serde(rename = "baseHP")]
    pub base_hp: i64,
    #[serde(rename = "maxLevelHP")]
    pub max_level_hp: i64,
    #[serde(rename = "freeDupeHP")]
    pub free_dupe_hp: i64,
    #[serde(rename = "rainbowHP")]
    pub rainbow_hp: i64,
    pub base_attack: i64,
    pub max_level_attack: i64,
    pub free_dupe_attack: i64,
    pub rainbow_attack: i64,
    pub base_defence: i64,
    #[serde(rename = "maxDefence")]
    pub max_level_defence: i64,
    pub free_dupe_defence: i64,
    pub rainbow_defence: i64,

    pub ki_multiplier: String,
    #[serde(rename = "ki12Multiplier", default, skip_serializing_if = "Option::is_none")]
    pub ki12_multiplier: Option<String>,
    #[serde(rename = "ki18Multiplier", default, skip_serializing_if = "Option::is_none")]
    pub ki18_multiplier: Option<String>,
    #[serde(rename = "ki24Multiplier", default, skip_serializing_if = "Option::is_none")]
    pub ki24_multiplier: Option<String>,

    /// `None` when the page shows no alternate forms; never an empty list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformations: Option<Vec<Transformation>>,
}

/// An alternate form shown in the card's form tabs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Transformation {
    #[serde(rename = "transformedID")]
    pub id: String,
    #[serde(rename = "transformedName")]
    pub name: String,
    #[serde(rename = "transformedClass")]
    pub class: Class,
    #[serde(rename = "transformedType")]
    pub char_type: Type,

    #[serde(rename = "transformedSuperAttack")]
    pub super_attack: String,
    #[serde(rename = "transformedEZASuperAttack", default, skip_serializing_if = "Option::is_none")]
    pub eza_super_attack: Option<String>,
    #[serde(rename = "transformedSEZASuperAttack", default, skip_serializing_if = "Option::is_none")]
    pub seza_super_attack: Option<String>,

    #[serde(rename = "transformedUltraSuperAttack", default, skip_serializing_if = "Option::is_none")]
    pub ultra_super_attack: Option<String>,
    #[serde(rename = "transformedEZAUltraSuperAttack", default, skip_serializing_if = "Option::is_none")]
    pub eza_ultra_super_attack: Option<String>,
    #[serde(rename = "transformedSEZAUltraSuperAttack", default, skip_serializing_if = "Option::is_none")]
    pub seza_ultra_super_attack: Option<String>,

    #[serde(rename = "transformedPassive")]
    pub passive: String,
    #[serde(rename = "transformedEZAPassive", default, skip_serializing_if = "Option::is_none")]
    pub eza_passive: Option<String>,
    #[serde(rename = "transformedSEZAPassive", default, skip_serializing_if = "Option::is_none")]
    pub seza_passive: Option<String>,

    #[serde(rename = "transformedActiveSkill", default, skip_serializing_if = "Option::is_none")]
    pub active_skill: Option<String>,
    #[serde(rename = "transformedActiveSkillCondition", default, skip_serializing_if = "Option::is_none")]
    pub active_skill_condition: Option<String>,

    #[serde(rename = "transformedLinks")]
    pub links: Vec<String>,
    #[serde(rename = "transformedImageURL")]
    pub image_url: String,
    #[serde(rename = "transformedFullImageURL")]
    pub full_image_url: String,
}

/// A page that could not be fetched after all retries.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FetchError {
    pub url: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
    pub retry_attempt: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeStats {
    pub total_characters: usize,
    /// Milliseconds.
    pub processing_time: u128,
    pub categories_processed: Vec<String>,
    pub errors: Vec<FetchError>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ScrapeResult {
    pub characters: Vec<Character>,
    pub stats: ScrapeStats,
}
