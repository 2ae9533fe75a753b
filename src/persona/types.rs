//! Core types for the persona system.
//!
//! A persona is one of the four evaluators on the panel. Each is bound to
//! exactly one responsibility; the validated panel is a [`PersonaSet`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::Responsibility;

/// Number of personas on a panel.
pub const PANEL_SIZE: usize = 4;

// ─────────────────────────────────────────────────────────────────
// Persona Descriptor (raw, from TOML)
// ─────────────────────────────────────────────────────────────────

/// Unvalidated persona entry as written in a persona file.
///
/// Every field is optional here so that a missing field is reported as a
/// persona configuration error rather than a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonaDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Character description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsibility: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_style: Option<String>,

    #[serde(default)]
    pub opening_lines: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Top-level shape of a persona file: a list of `[[persona]]` tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaFile {
    #[serde(default, rename = "persona")]
    pub personas: Vec<PersonaDescriptor>,
}

impl PersonaDescriptor {
    /// Validate required fields and resolve the responsibility.
    pub fn validate(&self, index: usize) -> Result<Persona> {
        let label = self
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("persona #{}", index + 1));

        let required = |field: &str, value: &Option<String>| -> Result<String> {
            match value {
                Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
                _ => Err(Error::persona_invalid(
                    label.clone(),
                    format!("required field '{}' is missing or blank", field),
                )),
            }
        };

        let id = required("id", &self.id)?;
        let display_name = required("display_name", &self.display_name)?;
        let persona_text = required("persona", &self.persona)?;
        let role_text = required("role", &self.role)?;
        let avatar_ref = required("avatar", &self.avatar)?;
        // Slugs are matched verbatim, without trimming or case folding.
        required("responsibility", &self.responsibility)?;
        let responsibility: Responsibility = self
            .responsibility
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(|e: String| Error::persona_invalid(label.clone(), e))?;

        Ok(Persona {
            id,
            display_name,
            persona_text,
            role_text,
            responsibility,
            speech_style: self
                .speech_style
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            opening_lines: self.opening_lines.clone(),
            avatar_ref,
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona
// ─────────────────────────────────────────────────────────────────

/// A validated evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub display_name: String,
    pub persona_text: String,
    pub role_text: String,
    pub responsibility: Responsibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speech_style: Option<String>,
    #[serde(default)]
    pub opening_lines: Vec<String>,
    pub avatar_ref: String,
}

impl Persona {
    /// The `n`th opening line, cycling through the list.
    pub fn opening_line(&self, n: usize) -> Option<&str> {
        if self.opening_lines.is_empty() {
            None
        } else {
            Some(self.opening_lines[n % self.opening_lines.len()].as_str())
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Persona Set
// ─────────────────────────────────────────────────────────────────

/// Exactly four personas with distinct ids and one per responsibility.
///
/// The only way to obtain one is through [`PersonaSet::new`], so holding a
/// `PersonaSet` means the panel invariant holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaSet {
    /// Indexed in `Responsibility::all()` order
    personas: Vec<Persona>,
}

impl PersonaSet {
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        if personas.len() != PANEL_SIZE {
            return Err(Error::persona_config(format!(
                "expected exactly {} personas, found {}",
                PANEL_SIZE,
                personas.len()
            )));
        }

        let mut ids = HashSet::new();
        for p in &personas {
            if !ids.insert(p.id.as_str()) {
                return Err(Error::persona_invalid(
                    p.id.clone(),
                    format!("duplicate persona id '{}'", p.id),
                ));
            }
        }

        let mut ordered = Vec::with_capacity(PANEL_SIZE);
        for r in Responsibility::all() {
            let mut holders = personas.iter().filter(|p| p.responsibility == *r);
            let holder = holders.next().ok_or_else(|| {
                Error::persona_config(format!("no persona is responsible for '{}'", r))
            })?;
            if let Some(second) = holders.next() {
                return Err(Error::persona_invalid(
                    second.id.clone(),
                    format!(
                        "responsibility '{}' is claimed by both '{}' and '{}'",
                        r, holder.id, second.id
                    ),
                ));
            }
            ordered.push(holder.clone());
        }

        Ok(Self { personas: ordered })
    }

    /// Validate raw descriptors into a panel.
    pub fn from_descriptors(descriptors: &[PersonaDescriptor]) -> Result<Self> {
        let personas = descriptors
            .iter()
            .enumerate()
            .map(|(i, d)| d.validate(i))
            .collect::<Result<Vec<_>>>()?;
        Self::new(personas)
    }

    /// The persona holding a responsibility.
    pub fn get(&self, responsibility: Responsibility) -> &Persona {
        // Construction guarantees one persona per responsibility in this order.
        let index = Responsibility::all()
            .iter()
            .position(|r| *r == responsibility)
            .unwrap_or(0);
        &self.personas[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Persona> {
        self.personas.iter()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(id: &str, responsibility: &str) -> PersonaDescriptor {
        PersonaDescriptor {
            id: Some(id.into()),
            display_name: Some(id.to_uppercase()),
            persona: Some("A careful judge.".into()),
            role: Some("Decide things.".into()),
            responsibility: Some(responsibility.into()),
            speech_style: None,
            opening_lines: vec![],
            avatar: Some(format!("avatars/{}.png", id)),
        }
    }

    fn panel() -> Vec<PersonaDescriptor> {
        vec![
            descriptor("sable", "color-rarity"),
            descriptor("aurelia", "name"),
            descriptor("ember", "attribute"),
            descriptor("quill", "flavor"),
        ]
    }

    #[test]
    fn test_valid_panel_is_ordered_by_responsibility() {
        let set = PersonaSet::from_descriptors(&panel()).unwrap();
        let ids: Vec<_> = set.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["aurelia", "quill", "ember", "sable"]);
        assert_eq!(set.get(Responsibility::ColorRarity).id, "sable");
    }

    #[test]
    fn test_missing_field_is_reported() {
        let mut descriptors = panel();
        descriptors[2].role = None;
        let err = PersonaSet::from_descriptors(&descriptors).unwrap_err();
        match err {
            Error::PersonaConfig { message, persona } => {
                assert!(message.contains("role"));
                assert_eq!(persona.as_deref(), Some("ember"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_blank_field_is_rejected() {
        let mut descriptors = panel();
        descriptors[0].display_name = Some("   ".into());
        assert!(PersonaSet::from_descriptors(&descriptors).is_err());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut descriptors = panel();
        descriptors[3].id = Some("ember".into());
        let err = PersonaSet::from_descriptors(&descriptors).unwrap_err();
        assert!(err.to_string().contains("duplicate persona id"));
    }

    #[test]
    fn test_opening_line_cycles() {
        let mut d = descriptor("quill", "flavor");
        d.opening_lines = vec!["one".into(), "two".into()];
        let p = d.validate(0).unwrap();
        assert_eq!(p.opening_line(0), Some("one"));
        assert_eq!(p.opening_line(3), Some("two"));

        let silent = descriptor("ember", "attribute").validate(0).unwrap();
        assert_eq!(silent.opening_line(0), None);
    }
}
