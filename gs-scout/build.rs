//! Build script for gs-scout
//!
//! Stamps the binary with the commit it was built from, the build time and
//! the cargo profile. `main.rs` folds these into `--version` output and the
//! startup log line.

use std::process::Command;

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}

fn main() {
    let git_hash = git_short_hash().unwrap_or_else(|| "unknown".to_string());
    let built_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GS_GIT_HASH={}", git_hash);
    println!("cargo:rustc-env=GS_BUILD_TIMESTAMP={}", built_at);
    println!("cargo:rustc-env=GS_BUILD_PROFILE={}", profile);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../.git/HEAD");
}
