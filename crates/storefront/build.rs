//! Build script for storefront crate.
//!
//! Generates content-based hashes for static assets (CSS and JS) used as
//! cache-busting query strings in templates.

use std::env;
use std::fs;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Static assets hashed at build time: (path under `static/`, env var).
const ASSETS: [(&str, &str); 2] = [
    ("css/main.css", "CSS_HASH"),
    ("js/storefront.js", "JS_HASH"),
];

fn main() {
    let manifest_dir =
        env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set by Cargo");
    let static_dir = Path::new(&manifest_dir).join("static");

    for (asset, var) in ASSETS {
        hash_asset(&static_dir.join(asset), var);
    }
}

/// Hash an asset and expose the first 8 hex chars as `var`.
///
/// Sets the variable for use with `env!(var)`.
fn hash_asset(path: &Path, var: &str) {
    // Tell Cargo to rerun if the asset changes
    println!("cargo:rerun-if-changed={}", path.display());

    let content = match fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            println!("cargo:warning=Could not read {}: {e}", path.display());
            println!("cargo:rustc-env={var}=");
            return;
        }
    };

    // Compute hash (first 8 chars of SHA256)
    let mut hasher = Sha256::new();
    hasher.update(&content);
    let hash = format!("{:x}", hasher.finalize());
    let short_hash = &hash[..8];

    // Set environment variable for compile-time access
    println!("cargo:rustc-env={var}={short_hash}");
}
