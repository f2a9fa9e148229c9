//! Build script for Dieta
//!
//! Bumps the persisted build counter and exposes build metadata to the crate.

use std::fs;
use std::path::Path;

const BUILD_NUMBER_FILE: &str = "build_number.txt";

/// Read the last recorded build number, treating a missing or garbled file as 0
fn read_build_number(path: &Path) -> u64 {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn main() {
    println!("cargo:rerun-if-changed=src");

    let counter = Path::new(BUILD_NUMBER_FILE);
    let build_number = read_build_number(counter) + 1;

    if let Err(e) = fs::write(counter, build_number.to_string()) {
        println!("cargo:warning=Could not persist build number: {}", e);
    }

    let compiled_at = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    println!("cargo:rustc-env=DIETA_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=DIETA_BUILD_TIMESTAMP={}", compiled_at);
}
