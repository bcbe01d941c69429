//! CLI command implementations.

pub mod clean;
pub mod plan;
pub mod profile;

use std::path::Path;

use sieve::{Sieve, SieveConfig};

/// Build a Sieve instance from an optional configuration file.
pub fn load_sieve(config: Option<&Path>) -> Result<Sieve, Box<dyn std::error::Error>> {
    let config = match config {
        Some(path) => SieveConfig::load(path)?,
        None => SieveConfig::default(),
    };
    Ok(Sieve::with_config(config))
}

/// Fail early with a readable message when the input is missing.
pub fn require_file(file: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }
    Ok(())
}
