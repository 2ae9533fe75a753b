//! Configuration loading tests
//!
//! Exercise the file loader against fixtures and temp files.

mod common;

use std::fs;

use cardforge::config::{init_config, ForgeConfig};
use cardforge::error::Error;
use tempfile::TempDir;

use common::{invalid_config_fixture, valid_config_fixture};

#[test]
fn test_load_valid_fixture() {
    let config = ForgeConfig::load(valid_config_fixture().to_str()).unwrap();

    assert_eq!(config.model.base_url, "http://localhost:11434/v1");
    assert_eq!(config.model.max_retries, 1);
    assert_eq!(config.vision.model, "llava");
    assert_eq!(config.generation.model, "llama3");
    assert_eq!(config.storage.max_cards, 20);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_unset_sections_keep_defaults() {
    let config = ForgeConfig::load(valid_config_fixture().to_str()).unwrap();
    assert_eq!(config.storage.collection_file, "collection.json");
    assert!(config.personas.file.is_none());
}

#[test]
fn test_invalid_fixture_fails_validation() {
    let err = ForgeConfig::load(invalid_config_fixture().to_str()).unwrap_err();
    assert!(matches!(err, Error::ConfigValidation { .. }));
    assert_eq!(err.exit_code(), 10);
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("broken.toml");
    fs::write(&path, "[model\nbase_url = ").unwrap();

    let err = ForgeConfig::load(path.to_str()).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));
}

#[test]
fn test_init_then_load_round_trip() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("config.toml");

    let written = init_config(path.to_str(), false).unwrap();
    assert!(written.exists());

    let config = ForgeConfig::load(path.to_str()).unwrap();
    assert_eq!(config.storage.max_cards, 100);
}

#[test]
fn test_tilde_paths_are_expanded() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[storage]\ndata_dir = \"~/cards\"\n").unwrap();

    let config = ForgeConfig::load(path.to_str()).unwrap();
    assert!(!config.storage.data_dir.starts_with('~'));
    assert!(config.collection_path().ends_with("cards/collection.json"));
}
