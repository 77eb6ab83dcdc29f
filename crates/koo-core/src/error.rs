//! Error types for KOOPAGES core
//!
//! Nothing in the directory is fatal: these errors surface at the edges
//! (store I/O, config files, data files) or describe a refused action.

use std::path::PathBuf;

/// Key-value store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("store io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file holds something other than a string map
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Value could not be encoded for storage
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Daily recommendation errors
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// Persisted state could not be read or written
    #[error("recommendation store failed: {0}")]
    Store(#[from] StoreError),
}

/// Navigation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    /// Target is not one of the configured sections
    #[error("unknown section: {0}")]
    UnknownSection(String),

    /// Navigation was never initialized (missing page target)
    #[error("navigation is not available")]
    Unavailable,
}

/// Directory data errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// Record failed validation
    #[error("invalid record: {}", .errors.join("; "))]
    InvalidRecord { errors: Vec<String> },

    /// Data file could not be read
    #[error("failed to read directory data from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data is not a record list or listing envelope
    #[error("directory data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Controller task errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    /// Controller task has stopped
    #[error("directory app task is not running")]
    Closed,
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this schema
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
