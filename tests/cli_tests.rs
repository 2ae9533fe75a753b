//! CLI integration tests
//!
//! Tests the command-line interface using assert_cmd

mod common;

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use common::{duplicate_personas_fixture, invalid_config_fixture, valid_config_fixture};

/// Get a command for the cardforge binary with an isolated environment
fn forge_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cardforge").unwrap();
    cmd.env_remove("CARDFORGE_CONFIG")
        .env_remove("CARDFORGE_PERSONA_FILE")
        .env_remove("RUST_LOG");
    cmd
}

// ─────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_help_flag() {
    forge_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("forge"))
        .stdout(predicate::str::contains("personas"))
        .stdout(predicate::str::contains("collection"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    forge_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("cardforge"))
        .stdout(predicate::str::contains("Build Information"))
        .stdout(predicate::str::contains("Revision"))
        .stdout(predicate::str::contains("Target"));
}

#[test]
fn test_forge_requires_image_argument() {
    forge_cmd()
        .arg("forge")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<IMAGE>"));
}

// ─────────────────────────────────────────────────────────────────
// Persona Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_personas_list_bundled_panel() {
    forge_cmd()
        .args(["--config", valid_config_fixture().to_str().unwrap()])
        .args(["personas", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name"))
        .stdout(predicate::str::contains("color-rarity"))
        .stdout(predicate::str::contains("Aurelia"));
}

#[test]
fn test_personas_validate_rejects_duplicate() {
    forge_cmd()
        .args(["--config", valid_config_fixture().to_str().unwrap()])
        .args(["personas", "validate", "--file"])
        .arg(duplicate_personas_fixture())
        .assert()
        .code(50)
        .stderr(predicate::str::contains("E500"));
}

#[test]
fn test_personas_validate_bundled() {
    forge_cmd()
        .args(["--config", valid_config_fixture().to_str().unwrap()])
        .args(["personas", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 personas"))
        .stdout(predicate::str::contains("bundled panel"));
}

// ─────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_config_validate_valid() {
    forge_cmd()
        .args(["config", "validate", "--config"])
        .arg(valid_config_fixture())
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_config_validate_invalid() {
    forge_cmd()
        .args(["config", "validate", "--config"])
        .arg(invalid_config_fixture())
        .assert()
        .code(10)
        .stderr(predicate::str::contains("temperature"));
}

#[test]
fn test_config_missing_file() {
    forge_cmd()
        .args(["config", "show", "--config", "/nonexistent/cardforge.toml"])
        .assert()
        .code(10)
        .stderr(predicate::str::contains("config init"));
}

#[test]
fn test_config_show_masks_api_key() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(&path, "[model]\napi_key = \"sk-secret-value\"\n").unwrap();

    forge_cmd()
        .env_remove("CARDFORGE_API_KEY")
        .args(["config", "show", "--config"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[generation]"))
        .stdout(predicate::str::contains("sk-secret-value").not());
}

#[test]
fn test_config_init_creates_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");

    forge_cmd()
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .success();
    assert!(path.exists());

    forge_cmd()
        .args(["config", "init", "--path"])
        .arg(&path)
        .assert()
        .failure();
}

// ─────────────────────────────────────────────────────────────────
// Collection Command Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_collection_list_empty() {
    let tmp = TempDir::new().unwrap();
    forge_cmd()
        .args(["config", "init", "--path"])
        .arg(tmp.path().join("config.toml"))
        .assert()
        .success();

    forge_cmd()
        .env("CARDFORGE_DATA_DIR", tmp.path())
        .args(["collection", "list", "--config"])
        .arg(tmp.path().join("config.toml"))
        .assert()
        .success()
        .stdout(predicate::str::contains("empty"))
        .stdout(predicate::str::contains("collection.json"));
}

#[test]
fn test_collection_show_rejects_bad_id() {
    let tmp = TempDir::new().unwrap();
    forge_cmd()
        .env("CARDFORGE_DATA_DIR", tmp.path())
        .args(["--config", valid_config_fixture().to_str().unwrap()])
        .args(["collection", "show", "not-a-uuid"])
        .assert()
        .code(80);
}

#[test]
fn test_forge_rejects_unsupported_image() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "not a photo").unwrap();

    forge_cmd()
        .args(["--config", valid_config_fixture().to_str().unwrap()])
        .arg("forge")
        .arg(&path)
        .assert()
        .code(20)
        .stderr(predicate::str::contains("unsupported file extension"));
}
