//! Build script for CardForge
//!
//! Stamps the binary with the git revision, build time, target and profile so
//! `cardforge version` and the HTTP user agent can report them.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=config/personas");

    let revision = git_revision();
    let built_at = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=CARDFORGE_GIT_REVISION={}", revision);
    println!("cargo:rustc-env=CARDFORGE_BUILT_AT={}", built_at);
    println!("cargo:rustc-env=CARDFORGE_TARGET={}", target);
    println!("cargo:rustc-env=CARDFORGE_PROFILE={}", profile);
}

/// Short commit hash, suffixed with `-dirty` when the tree has local edits.
fn git_revision() -> String {
    let hash = git(&["rev-parse", "--short=8", "HEAD"]).unwrap_or_else(|| "unknown".to_string());
    match git(&["status", "--porcelain"]) {
        Some(status) if !status.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

fn git(args: &[&str]) -> Option<String> {
    Command::new("git")
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
}
