//! Error types for the KOOPAGES server

use koo_core::{ConfigError, DirectoryError, RecommendError, StoreError};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Startup and configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Server config file could not be read
    #[error("failed to read server config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Server config file is not valid TOML for this schema
    #[error("failed to parse server config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Environment override or field value is unusable
    #[error("invalid server configuration: {0}")]
    Invalid(String),

    /// Embedded site config is inconsistent
    #[error(transparent)]
    Site(#[from] ConfigError),

    /// Directory data file could not be loaded
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Recommendation state file could not be opened
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Listener could not be bound
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },
}

/// Request failures turned into HTTP responses by the recovery handler
#[derive(Debug)]
pub enum ApiRejection {
    /// Token bucket for the client address is empty
    RateLimited,
    /// Daily pick could not be computed
    Recommendation(String),
}

impl warp::reject::Reject for ApiRejection {}

impl From<RecommendError> for ApiRejection {
    fn from(err: RecommendError) -> Self {
        Self::Recommendation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_display() {
        let err = ServerError::Invalid("PORT must be a number".into());
        assert_eq!(err.to_string(), "invalid server configuration: PORT must be a number");
    }

    #[test]
    fn site_error_is_transparent() {
        let err: ServerError = ConfigError::Invalid("navigation.sections is empty".into()).into();
        assert_eq!(err.to_string(), "invalid configuration: navigation.sections is empty");
    }
}
