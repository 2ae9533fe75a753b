//! Card integration
//!
//! Merges the settled contributions into one `CardRecord`, keyed strictly by
//! responsibility. This is the only place fallback values are decided.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{
    Attribute, CardRecord, Contribution, ContributionMap, DiscussionEntry, FeatureRecord, Rarity,
    Responsibility,
};

/// Name used when the name persona failed.
pub const FALLBACK_NAME: &str = "Name Unknown";

/// Flavor text used when the flavor persona failed.
pub const FALLBACK_FLAVOR: &str = "Its story remains shrouded in mystery.";

/// Effect templates; `{object}` is replaced by the feature's object type.
const EFFECT_TEMPLATES: &[&str] = &[
    "When this card enters play, summon the spirit of the {object} to guard your side for one turn.",
    "Once per turn, the {object} may reflect the first attack targeting it back at its source.",
    "While the {object} is on the field, allied cards gain +1 resilience.",
    "Discard this card to draw two cards inspired by the {object}.",
    "When the {object} is destroyed, return one fallen ally to your hand.",
    "At the start of your turn, the {object} channels hidden energy: gain one extra action.",
    "Opponents cannot target the {object} during the turn it is played.",
    "Reveal the {object} to negate one effect of equal or lower rarity.",
];

/// Deterministic effect text for an object type.
///
/// The same object type always selects the same template, and the result
/// always names the object type.
pub fn derive_effect(object_type: &str) -> String {
    let object = object_type.trim();
    let digest = Sha256::digest(object.to_lowercase().as_bytes());
    let index = usize::from(digest[0]) % EFFECT_TEMPLATES.len();
    EFFECT_TEMPLATES[index].replace("{object}", object)
}

/// Builds finished cards from a discussion.
#[derive(Debug, Clone, Default)]
pub struct CardIntegrator;

impl CardIntegrator {
    pub fn new() -> Self {
        Self
    }

    /// Merge contributions into a card.
    ///
    /// Missing contributions fall back; only a structurally wrong map or
    /// absent feature/image input is an error.
    pub fn integrate(
        &self,
        contributions: &ContributionMap,
        feature: &FeatureRecord,
        image_ref: &str,
        image_data: &str,
        log: Vec<DiscussionEntry>,
    ) -> Result<CardRecord> {
        validate_shape(contributions)?;

        if feature.object_type.trim().is_empty() {
            return Err(Error::integration("feature record is missing its object type"));
        }
        if image_ref.trim().is_empty() {
            return Err(Error::integration("image reference is missing"));
        }
        if image_data.trim().is_empty() {
            return Err(Error::integration("image data is missing"));
        }

        let mut name = FALLBACK_NAME.to_string();
        let mut flavor_text = FALLBACK_FLAVOR.to_string();
        let mut attribute = Attribute::default();
        let mut rarity = Rarity::default();
        let mut color = None;

        for (_, contribution) in contributions.iter() {
            let Some(partial) = contribution else { continue };
            match &partial.contribution {
                Contribution::Name { name: n } => name = n.clone(),
                Contribution::Flavor { flavor_text: f } => flavor_text = f.clone(),
                Contribution::Attribute { attribute: a } => attribute = *a,
                Contribution::ColorRarity { color: c, rarity: r } => {
                    color = Some(c.clone());
                    rarity = *r;
                }
            }
        }

        let fallbacks = contributions.failed();
        debug!(
            fallbacks = ?fallbacks.iter().map(|r| r.slug()).collect::<Vec<_>>(),
            "Integrating card"
        );

        Ok(CardRecord {
            id: Uuid::new_v4(),
            name,
            attribute,
            rarity,
            color,
            effect: derive_effect(&feature.object_type),
            flavor_text,
            description: feature.detailed_description.clone(),
            image_ref: image_ref.to_string(),
            image_data: image_data.to_string(),
            created_at: Utc::now(),
            discussion_log: log,
        })
    }
}

fn validate_shape(contributions: &ContributionMap) -> Result<()> {
    if contributions.len() != Responsibility::all().len() {
        return Err(Error::integration(format!(
            "expected {} responsibilities, found {}",
            Responsibility::all().len(),
            contributions.len()
        )));
    }

    for r in Responsibility::all() {
        if !contributions.contains_key(*r) {
            return Err(Error::integration(format!("responsibility '{}' is missing", r)));
        }
    }

    for (key, contribution) in contributions.iter() {
        if let Some(partial) = contribution {
            if partial.responsibility() != key {
                return Err(Error::integration(format!(
                    "contribution for '{}' is tagged '{}'",
                    key,
                    partial.responsibility()
                )));
            }
        }
    }

    Ok(())
}
