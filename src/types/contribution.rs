//! Responsibilities and the partial results each persona contributes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::card::{Attribute, Rarity};

// ─────────────────────────────────────────────────────────────────
// Responsibility
// ─────────────────────────────────────────────────────────────────

/// The four mutually exclusive parts of a card a persona can decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Responsibility {
    /// Card name
    Name,
    /// Flavor text
    Flavor,
    /// Elemental attribute
    Attribute,
    /// Signature color and rarity tier
    ColorRarity,
}

impl Responsibility {
    /// Slug used in persona files, logs and JSON.
    pub fn slug(&self) -> &'static str {
        match self {
            Responsibility::Name => "name",
            Responsibility::Flavor => "flavor",
            Responsibility::Attribute => "attribute",
            Responsibility::ColorRarity => "color-rarity",
        }
    }

    /// All responsibilities in card order.
    pub fn all() -> &'static [Responsibility] {
        &[
            Responsibility::Name,
            Responsibility::Flavor,
            Responsibility::Attribute,
            Responsibility::ColorRarity,
        ]
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Responsibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(Responsibility::Name),
            "flavor" => Ok(Responsibility::Flavor),
            "attribute" => Ok(Responsibility::Attribute),
            "color-rarity" => Ok(Responsibility::ColorRarity),
            _ => Err(format!(
                "Unknown responsibility '{}'. Valid: name, flavor, attribute, color-rarity",
                s
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Contributions
// ─────────────────────────────────────────────────────────────────

/// The card fields a single responsibility decides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "responsibility", rename_all = "kebab-case")]
pub enum Contribution {
    Name {
        name: String,
    },
    Flavor {
        #[serde(rename = "flavorText")]
        flavor_text: String,
    },
    Attribute {
        attribute: Attribute,
    },
    ColorRarity {
        color: String,
        rarity: Rarity,
    },
}

impl Contribution {
    pub fn responsibility(&self) -> Responsibility {
        match self {
            Contribution::Name { .. } => Responsibility::Name,
            Contribution::Flavor { .. } => Responsibility::Flavor,
            Contribution::Attribute { .. } => Responsibility::Attribute,
            Contribution::ColorRarity { .. } => Responsibility::ColorRarity,
        }
    }
}

/// One persona's successful output: its decision plus what it said.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialContribution {
    #[serde(flatten)]
    pub contribution: Contribution,

    /// Persona-voiced remark that becomes a discussion entry
    pub utterance: String,
}

impl PartialContribution {
    pub fn new(contribution: Contribution, utterance: impl Into<String>) -> Self {
        Self {
            contribution,
            utterance: utterance.into(),
        }
    }

    pub fn responsibility(&self) -> Responsibility {
        self.contribution.responsibility()
    }
}

// ─────────────────────────────────────────────────────────────────
// Contribution Map
// ─────────────────────────────────────────────────────────────────

/// Settled outcome of a discussion, keyed by responsibility.
///
/// `None` marks a responsibility whose persona failed. A well-formed map has
/// exactly the four known keys; the integrator rejects anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContributionMap(BTreeMap<Responsibility, Option<PartialContribution>>);

impl ContributionMap {
    /// A map with every responsibility present and unsettled.
    pub fn unsettled() -> Self {
        Self(Responsibility::all().iter().map(|r| (*r, None)).collect())
    }

    /// Build from raw entries without checking the shape.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Responsibility, Option<PartialContribution>)>,
    ) -> Self {
        Self(entries.into_iter().collect())
    }

    /// Record the outcome for one responsibility.
    pub fn settle(&mut self, responsibility: Responsibility, outcome: Option<PartialContribution>) {
        self.0.insert(responsibility, outcome);
    }

    /// The successful contribution for a responsibility, if any.
    pub fn get(&self, responsibility: Responsibility) -> Option<&PartialContribution> {
        self.0.get(&responsibility).and_then(Option::as_ref)
    }

    pub fn contains_key(&self, responsibility: Responsibility) -> bool {
        self.0.contains_key(&responsibility)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Responsibility, Option<&PartialContribution>)> {
        self.0.iter().map(|(r, c)| (*r, c.as_ref()))
    }

    /// Responsibilities that have no contribution.
    pub fn failed(&self) -> Vec<Responsibility> {
        self.0
            .iter()
            .filter(|(_, c)| c.is_none())
            .map(|(r, _)| *r)
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.0.values().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_responsibility_from_str() {
        assert_eq!("name".parse::<Responsibility>().unwrap(), Responsibility::Name);
        assert_eq!("flavor".parse::<Responsibility>().unwrap(), Responsibility::Flavor);
        assert_eq!(
            "color-rarity".parse::<Responsibility>().unwrap(),
            Responsibility::ColorRarity
        );
        assert!("effect".parse::<Responsibility>().is_err());
        assert!("Flavor".parse::<Responsibility>().is_err());
        assert!("colour-rarity".parse::<Responsibility>().is_err());
    }

    #[test]
    fn test_responsibility_serde() {
        let json = serde_json::to_string(&Responsibility::ColorRarity).unwrap();
        assert_eq!(json, "\"color-rarity\"");
    }

    #[test]
    fn test_partial_contribution_wire_shape() {
        let c = PartialContribution::new(
            Contribution::ColorRarity {
                color: "red".into(),
                rarity: Rarity::Rare,
            },
            "A rare find!",
        );
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["responsibility"], "color-rarity");
        assert_eq!(json["rarity"], "Rare");
        assert_eq!(json["utterance"], "A rare find!");

        let back: PartialContribution = serde_json::from_value(json).unwrap();
        assert_eq!(back, c);
    }

    #[test]
    fn test_unsettled_map_has_all_keys() {
        let map = ContributionMap::unsettled();
        assert_eq!(map.len(), 4);
        assert_eq!(map.failed().len(), 4);
        assert_eq!(map.success_count(), 0);
    }

    #[test]
    fn test_settle_replaces_outcome() {
        let mut map = ContributionMap::unsettled();
        map.settle(
            Responsibility::Name,
            Some(PartialContribution::new(
                Contribution::Name { name: "Crimson Guardian".into() },
                "Behold.",
            )),
        );
        assert_eq!(map.success_count(), 1);
        assert!(map.get(Responsibility::Name).is_some());
        assert!(map.get(Responsibility::Flavor).is_none());
        assert!(!map.failed().contains(&Responsibility::Name));
    }
}
