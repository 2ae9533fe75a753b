//! Card records and the discussion log attached to them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────
// Attribute
// ─────────────────────────────────────────────────────────────────

/// Elemental attribute of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Attribute {
    /// Primary attribute, used when nobody decided
    #[default]
    Fire,
    Water,
    Earth,
    Wind,
    Light,
    Dark,
}

impl Attribute {
    pub fn all() -> &'static [Attribute] {
        &[
            Attribute::Fire,
            Attribute::Water,
            Attribute::Earth,
            Attribute::Wind,
            Attribute::Light,
            Attribute::Dark,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Fire => "Fire",
            Attribute::Water => "Water",
            Attribute::Earth => "Earth",
            Attribute::Wind => "Wind",
            Attribute::Light => "Light",
            Attribute::Dark => "Dark",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Attribute::all()
            .iter()
            .find(|a| a.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| {
                format!(
                    "Unknown attribute '{}'. Valid: Fire, Water, Earth, Wind, Light, Dark",
                    s
                )
            })
    }
}

// ─────────────────────────────────────────────────────────────────
// Rarity
// ─────────────────────────────────────────────────────────────────

/// Rarity tier, ordered `Common < Rare < Epic < Legendary`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Rarity {
    #[default]
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn all() -> &'static [Rarity] {
        &[Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Rare => "Rare",
            Rarity::Epic => "Epic",
            Rarity::Legendary => "Legendary",
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rarity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Rarity::all()
            .iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| {
                format!("Unknown rarity '{}'. Valid: Common, Rare, Epic, Legendary", s)
            })
    }
}

// ─────────────────────────────────────────────────────────────────
// Discussion Log
// ─────────────────────────────────────────────────────────────────

/// Phase of the discussion an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Opening,
    Analysis,
    Discussion,
    Conclusion,
}

/// A single remark in the discussion log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionEntry {
    pub id: Uuid,
    pub persona_id: String,
    pub persona_display_name: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub kind: EntryKind,
}

impl DiscussionEntry {
    pub fn new(
        persona_id: impl Into<String>,
        persona_display_name: impl Into<String>,
        text: impl Into<String>,
        kind: EntryKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            persona_id: persona_id.into(),
            persona_display_name: persona_display_name.into(),
            text: text.into(),
            created_at: Utc::now(),
            kind,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Card Record
// ─────────────────────────────────────────────────────────────────

/// A finished card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    pub id: Uuid,
    pub name: String,
    pub attribute: Attribute,
    pub rarity: Rarity,

    /// Signature color chosen alongside the rarity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    pub effect: String,
    pub flavor_text: String,

    /// Verbatim copy of the feature record's description
    pub description: String,

    pub image_ref: String,

    /// Image as a data URL
    pub image_data: String,

    pub created_at: DateTime<Utc>,
    pub discussion_log: Vec<DiscussionEntry>,
}
