//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use cardforge::backend::MockBackend;
use cardforge::types::ImageAsset;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

pub fn duplicate_personas_fixture() -> PathBuf {
    fixture_path("duplicate_personas.toml")
}

// ─────────────────────────────────────────────────────────────────
// Scripted model replies
// ─────────────────────────────────────────────────────────────────

/// Vision reply for the toy robot scenario
pub const ROBOT_FEATURES: &str = r#"{
  "objectType": "toy robot",
  "colors": ["red", "blue"],
  "shapes": ["humanoid"],
  "materials": ["plastic"],
  "detailedDescription": "a small articulated robot figure"
}"#;

pub const NAME_REPLY: &str =
    r#"{"result": {"name": "Crimson Guardian"}, "message": "I name thee Crimson Guardian!"}"#;
pub const FLAVOR_REPLY: &str = r#"{"result": {"flavorText": "It kept watch over the toybox long after the lights went out."}, "message": "A quiet sentinel, this one."}"#;
pub const ATTRIBUTE_REPLY: &str =
    r#"{"result": {"attribute": "Fire"}, "message": "That red shell burns bright. Fire!"}"#;
/// An attribute other than the fallback, so a real contribution is visible
pub const WATER_ATTRIBUTE_REPLY: &str =
    r#"{"result": {"attribute": "Water"}, "message": "Blue joints, cool head. Water."}"#;
pub const COLOR_RARITY_REPLY: &str =
    r#"{"result": {"color": "red", "rarity": "Rare"}, "message": "Red, and rare at that."}"#;

/// Prompt markers that select one persona's generation call
pub const NAME_MARKER: &str = "Responsibility: name";
pub const FLAVOR_MARKER: &str = "Responsibility: flavor";
pub const ATTRIBUTE_MARKER: &str = "Responsibility: attribute";
pub const COLOR_RARITY_MARKER: &str = "Responsibility: color-rarity";

/// A mock where vision and all four personas succeed
pub fn robot_mock() -> MockBackend {
    MockBackend::new()
        .with_vision_response(ROBOT_FEATURES)
        .respond_when(NAME_MARKER, NAME_REPLY)
        .respond_when(FLAVOR_MARKER, FLAVOR_REPLY)
        .respond_when(ATTRIBUTE_MARKER, ATTRIBUTE_REPLY)
        .respond_when(COLOR_RARITY_MARKER, COLOR_RARITY_REPLY)
}

/// A mock whose personas complete after the given delays (ms), in
/// name, flavor, attribute, color-rarity order
pub fn robot_mock_with_delays(delays: [u64; 4]) -> MockBackend {
    MockBackend::new()
        .with_vision_response(ROBOT_FEATURES)
        .respond_after(NAME_MARKER, Duration::from_millis(delays[0]), NAME_REPLY)
        .respond_after(FLAVOR_MARKER, Duration::from_millis(delays[1]), FLAVOR_REPLY)
        .respond_after(ATTRIBUTE_MARKER, Duration::from_millis(delays[2]), ATTRIBUTE_REPLY)
        .respond_after(
            COLOR_RARITY_MARKER,
            Duration::from_millis(delays[3]),
            COLOR_RARITY_REPLY,
        )
}

/// A small in-memory "photo"
pub fn robot_image() -> ImageAsset {
    ImageAsset::new(
        "robot.png",
        "image/png",
        vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    )
}
