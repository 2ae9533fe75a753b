//! Persona registry: loads and validates the evaluator panel.
//!
//! The bundled panel is compiled into the binary; a TOML file can replace it.
//! Validation happens here, once, before any discussion can start.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::types::Responsibility;

use super::types::{PersonaFile, PersonaSet};

const BUNDLED_PANEL: &str = include_str!("../../config/personas/evaluators.toml");

/// Where the panel definition comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonaSource {
    /// The default panel compiled into the binary
    Bundled,
    /// A persona file on disk
    File(PathBuf),
    /// TOML text supplied by the caller
    Inline(String),
}

/// Registry of the persona panel.
pub struct PersonaRegistry {
    source: PersonaSource,
}

impl PersonaRegistry {
    pub fn new(source: PersonaSource) -> Self {
        Self { source }
    }

    /// Registry serving the bundled default panel.
    pub fn bundled() -> Self {
        Self::new(PersonaSource::Bundled)
    }

    /// Registry reading from `file` if given, the bundled panel otherwise.
    pub fn from_optional_file(file: Option<&str>) -> Self {
        match file {
            Some(path) => Self::new(PersonaSource::File(PathBuf::from(path))),
            None => Self::bundled(),
        }
    }

    pub fn source(&self) -> &PersonaSource {
        &self.source
    }

    /// Load the panel and enforce the four-persona invariant.
    pub fn load_personas(&self) -> Result<PersonaSet> {
        let text = match &self.source {
            PersonaSource::Bundled => BUNDLED_PANEL.to_string(),
            PersonaSource::File(path) => read_persona_file(path)?,
            PersonaSource::Inline(text) => text.clone(),
        };

        let file: PersonaFile = toml::from_str(&text)
            .map_err(|e| Error::persona_config(format!("failed to parse persona TOML: {}", e)))?;
        debug!(entries = file.personas.len(), source = ?self.source, "Parsed persona file");

        let set = PersonaSet::from_descriptors(&file.personas)?;

        info!(
            personas = %set.iter().map(|p| p.id.as_str()).collect::<Vec<_>>().join(","),
            "Persona panel loaded"
        );
        Ok(set)
    }

    /// One line per responsibility describing who holds it.
    pub fn describe(set: &PersonaSet) -> Vec<PersonaListing> {
        Responsibility::all()
            .iter()
            .map(|r| {
                let p = set.get(*r);
                PersonaListing {
                    responsibility: *r,
                    id: p.id.clone(),
                    display_name: p.display_name.clone(),
                }
            })
            .collect()
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Summary of a panel seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonaListing {
    pub responsibility: Responsibility,
    pub id: String,
    pub display_name: String,
}

fn read_persona_file(path: &Path) -> Result<String> {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    fs::read_to_string(&expanded).map_err(|e| {
        Error::persona_config(format!("cannot read persona file {}: {}", expanded, e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn persona_toml(entries: &[(&str, &str)]) -> String {
        entries
            .iter()
            .map(|(id, responsibility)| {
                format!(
                    r#"
[[persona]]
id = "{id}"
display_name = "{id}"
persona = "Judge {id}"
role = "Decides {responsibility}"
responsibility = "{responsibility}"
avatar = "{id}.png"
"#
                )
            })
            .collect()
    }

    fn load_inline(text: String) -> Result<PersonaSet> {
        PersonaRegistry::new(PersonaSource::Inline(text)).load_personas()
    }

    #[test]
    fn test_bundled_panel_is_valid() {
        let set = PersonaRegistry::bundled().load_personas().unwrap();
        assert_eq!(set.len(), 4);
        for r in Responsibility::all() {
            assert_eq!(set.get(*r).responsibility, *r);
        }
    }

    #[test]
    fn test_rejects_three_personas() {
        let text = persona_toml(&[("a", "name"), ("b", "flavor"), ("c", "attribute")]);
        assert!(matches!(load_inline(text), Err(Error::PersonaConfig { .. })));
    }

    #[test]
    fn test_rejects_five_personas() {
        let text = persona_toml(&[
            ("a", "name"),
            ("b", "flavor"),
            ("c", "attribute"),
            ("d", "color-rarity"),
            ("e", "name"),
        ]);
        assert!(matches!(load_inline(text), Err(Error::PersonaConfig { .. })));
    }

    #[test]
    fn test_rejects_duplicate_responsibility() {
        let text = persona_toml(&[
            ("a", "name"),
            ("b", "name"),
            ("c", "attribute"),
            ("d", "color-rarity"),
        ]);
        let err = load_inline(text).unwrap_err();
        assert!(matches!(err, Error::PersonaConfig { .. }));
        assert!(err.to_string().contains("claimed by both"));
    }

    #[test]
    fn test_rejects_unknown_responsibility() {
        let text = persona_toml(&[
            ("a", "name"),
            ("b", "flavor"),
            ("c", "attribute"),
            ("d", "effect"),
        ]);
        let err = load_inline(text).unwrap_err();
        assert!(matches!(err, Error::PersonaConfig { .. }));
        assert!(err.to_string().contains("Unknown responsibility"));
    }

    #[test]
    fn test_rejects_responsibility_spelling_variants() {
        for variant in ["flavour", "Name", "NAME", "colour-rarity", "color_rarity", " attribute"] {
            let mut entries = vec![
                ("a", "name"),
                ("b", "flavor"),
                ("c", "attribute"),
                ("d", "color-rarity"),
            ];
            let slot = match variant.trim().to_lowercase().as_str() {
                "name" => 0,
                "flavour" => 1,
                "attribute" => 2,
                _ => 3,
            };
            entries[slot].1 = variant;
            let err = load_inline(persona_toml(&entries)).unwrap_err();
            assert!(
                matches!(err, Error::PersonaConfig { .. }),
                "{variant:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_mixed_case_panel() {
        let text = persona_toml(&[
            ("a", "NAME"),
            ("b", "flavour"),
            ("c", "Attribute"),
            ("d", "colour-rarity"),
        ]);
        assert!(matches!(load_inline(text), Err(Error::PersonaConfig { .. })));
    }

    #[test]
    fn test_rejects_wrong_field_shape() {
        let text = r#"
[[persona]]
id = "a"
display_name = "A"
persona = "x"
role = "y"
responsibility = 7
avatar = "a.png"
"#;
        assert!(matches!(
            load_inline(text.to_string()),
            Err(Error::PersonaConfig { .. })
        ));
    }

    #[test]
    fn test_loads_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("panel.toml");
        fs::write(
            &path,
            persona_toml(&[
                ("a", "name"),
                ("b", "flavor"),
                ("c", "attribute"),
                ("d", "color-rarity"),
            ]),
        )
        .unwrap();

        let set = PersonaRegistry::new(PersonaSource::File(path)).load_personas().unwrap();
        assert_eq!(set.get(Responsibility::Flavor).id, "b");
    }

    #[test]
    fn test_missing_file_is_persona_error() {
        let registry = PersonaRegistry::new(PersonaSource::File(PathBuf::from(
            "/nonexistent/panel.toml",
        )));
        assert!(matches!(
            registry.load_personas(),
            Err(Error::PersonaConfig { .. })
        ));
    }

    #[test]
    fn test_describe_lists_every_seat() {
        let set = PersonaRegistry::bundled().load_personas().unwrap();
        let listing = PersonaRegistry::describe(&set);
        assert_eq!(listing.len(), 4);
        assert_eq!(listing[0].responsibility, Responsibility::Name);
    }
}
