//! Error types for encounter definition loading

use std::path::PathBuf;
use thiserror::Error;

/// Errors while reading encounter definitions from disk
#[derive(Debug, Error)]
pub enum DslError {
    #[error("failed to read {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to read directory {path}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid definition in {path}: {reason}")]
    InvalidDefinition { path: PathBuf, reason: String },
}
