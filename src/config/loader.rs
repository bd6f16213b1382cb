//! # Config File Loader
//!
//! Reads a config file into a raw fragment that can be merged into a
//! [`ConfigStore`](super::ConfigStore).
//!
//! The format is picked from the file extension:
//!
//! | Extension | Parser       |
//! |-----------|--------------|
//! | `.json`   | `serde_json` |
//! | `.toml`   | `toml`       |
//!
//! Paths that do not exist yield `Ok(None)` so callers can list optional
//! files (e.g. a `local` override next to a `global` config) without
//! checking for them first.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use super::error::ConfigError;

/// Loads a single config fragment.
///
/// # Returns
///
/// - `Ok(Some(fragment))` if the file exists and parsed successfully
/// - `Ok(None)` if the file does not exist
/// - `Err(ConfigError)` if the file exists but could not be read or parsed
pub fn load_fragment(path: &Path) -> Result<Option<Value>, ConfigError> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file not found, skipping");
        return Ok(None);
    }

    let format = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let fragment: Value = match format.as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?,
        Some("toml") => toml::from_str(&content).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    debug!(path = %path.display(), "Loaded config file");
    Ok(Some(fragment))
}
