//! JSON persistence for plans, reports and profiles.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, SieveError};

/// Create the parent directory of `path` if it does not exist.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                SieveError::Persistence(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }
    Ok(())
}

/// Write a value as pretty-printed JSON.
pub(crate) fn save_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<()> {
    ensure_parent_dir(path)?;

    let file = File::create(path).map_err(|e| {
        SieveError::Persistence(format!(
            "Failed to create file '{}': {}",
            path.display(),
            e
        ))
    })?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| SieveError::Persistence(format!("Failed to serialize {}: {}", what, e)))?;
    writer.flush().map_err(|e| SieveError::io(path, e))?;
    Ok(())
}

/// Read a JSON value from a file.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let file = File::open(path).map_err(|e| SieveError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| {
        SieveError::Persistence(format!(
            "Failed to parse {} '{}': {}",
            what,
            path.display(),
            e
        ))
    })
}
