//! Error types for config file loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading config fragments from disk.
///
/// A missing file is not an error; it is skipped by the loader.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Invalid JSON in config file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file is not valid TOML.
    #[error("Invalid TOML in config file {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The file extension does not map to a known format.
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(PathBuf),
}
