//! Error types for configuration files.

use std::path::PathBuf;

/// Errors that can occur while loading, saving or reading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Configuration root must be a JSON object")]
    NotAnObject,

    #[error("Missing key: {0}")]
    MissingKey(String),

    #[error("Invalid value for {key}: {source}")]
    InvalidValue {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("No file associated with this store")]
    NoPath,
}
