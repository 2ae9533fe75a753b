//! Persona system for the four-evaluator panel.
//!
//! Each persona owns exactly one card responsibility (name, flavor,
//! attribute, color-rarity). The panel is loaded and validated once at
//! startup; a panel that breaks the invariant is a fatal configuration error.

pub mod registry;
pub mod types;

pub use registry::{PersonaListing, PersonaRegistry, PersonaSource};
pub use types::{Persona, PersonaDescriptor, PersonaFile, PersonaSet, PANEL_SIZE};
