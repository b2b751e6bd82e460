//! Build script for MeokPT
//!
//! Bumps the build counter whenever sources change and embeds it, with the
//! build time, as compile-time environment variables.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

/// Read the stored counter (missing or unreadable counts as 0) and add one
fn next_build_number(path: &Path) -> u64 {
    let current = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0);
    current + 1
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter_path = Path::new(BUILD_NUMBER_FILE);
    let build_number = next_build_number(counter_path);

    if let Err(e) = fs::write(counter_path, build_number.to_string()) {
        println!("cargo:warning=Could not persist build number: {}", e);
    }

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=MEOKPT_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=MEOKPT_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:warning=MeokPT build #{} at {}", build_number, timestamp);
}
