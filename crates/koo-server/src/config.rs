//! Server configuration
//!
//! TOML file (every field optional) with `PORT` and `KOO_ENV` environment
//! overrides applied last.

use crate::error::ServerError;
use koo_core::SiteConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-IP token bucket settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per window (bucket size)
    pub capacity: u32,
    pub window_secs: u64,
    /// Clients tracked at once; the least recently seen are evicted first
    pub max_clients: u64,
}

impl RateLimitConfig {
    /// Tokens regained per second
    #[must_use]
    pub fn refill_per_sec(&self) -> f64 {
        if self.window_secs == 0 {
            return f64::from(self.capacity);
        }
        #[allow(clippy::cast_precision_loss)]
        let window = self.window_secs as f64;
        f64::from(self.capacity) / window
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            window_secs: 15 * 60,
            max_clients: 100_000,
        }
    }
}

/// `Cache-Control` max-age rules for static files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Seconds, for ordinary files
    pub default_max_age: u64,
    /// Seconds, for the long-lived assets below
    pub asset_max_age: u64,
    /// File names served with `asset_max_age`
    pub long_lived: Vec<String>,
}

impl CacheConfig {
    /// Max-age for a served file
    #[must_use]
    pub fn max_age_for(&self, path: &Path) -> u64 {
        let long = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.long_lived.iter().any(|l| l == name));
        if long {
            self.asset_max_age
        } else {
            self.default_max_age
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_max_age: 24 * 60 * 60,
            asset_max_age: 7 * 24 * 60 * 60,
            long_lived: vec![
                "icons.svg".to_string(),
                "styles-lite.css".to_string(),
                "script.js".to_string(),
            ],
        }
    }
}

/// Complete server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Directory served as static files; `index.html` and `404.html` live here
    pub public_dir: PathBuf,
    /// JSON record list; the bundled list when absent
    pub data_file: Option<PathBuf>,
    /// JSON key-value file for the daily pick; in-memory when absent
    pub state_file: Option<PathBuf>,
    pub rate_limit: RateLimitConfig,
    pub cache: CacheConfig,
    pub environment: String,
    pub site: SiteConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 3000,
            public_dir: PathBuf::from("public"),
            data_file: None,
            state_file: None,
            rate_limit: RateLimitConfig::default(),
            cache: CacheConfig::default(),
            environment: "development".to_string(),
            site: SiteConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ServerError> {
        let config: Self = toml::from_str(text)?;
        config.site.validate()?;
        Ok(config)
    }

    /// Load from an optional file, then apply process environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ServerError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|source| ServerError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `PORT` and `KOO_ENV` from a variable lookup
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ServerError> {
        if let Some(port) = var("PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| ServerError::Invalid(format!("PORT must be a port number, got {port:?}")))?;
        }
        if let Some(env) = var("KOO_ENV") {
            self.environment = env;
        }
        Ok(())
    }

    /// With listen port
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// With static file directory
    #[inline]
    #[must_use]
    pub fn with_public_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.public_dir = dir.into();
        self
    }

    /// With directory data file
    #[inline]
    #[must_use]
    pub fn with_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_file = Some(path.into());
        self
    }

    /// With recommendation state file
    #[inline]
    #[must_use]
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    /// Listen address
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.rate_limit.capacity, 100);
        assert_eq!(config.rate_limit.window(), Duration::from_secs(900));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn env_overrides() {
        let mut config = ServerConfig::default();
        config
            .apply_env(|key| match key {
                "PORT" => Some("8080".to_string()),
                "KOO_ENV" => Some("production".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "production");

        let err = config
            .apply_env(|key| (key == "PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ServerError::Invalid(_)));
    }

    #[test]
    fn toml_with_nested_site() {
        let config = ServerConfig::from_toml_str(
            r#"
            port = 4000
            public_dir = "site"

            [rate_limit]
            capacity = 5

            [site.search]
            debounce_delay_ms = 200
            "#,
        )
        .unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.public_dir, PathBuf::from("site"));
        assert_eq!(config.rate_limit.capacity, 5);
        assert_eq!(config.rate_limit.window_secs, 900);
        assert_eq!(config.site.search.debounce_delay_ms, 200);
    }

    #[test]
    fn cache_rules() {
        let cache = CacheConfig::default();
        assert_eq!(cache.max_age_for(Path::new("public/icons.svg")), 604_800);
        assert_eq!(cache.max_age_for(Path::new("public/index.html")), 86_400);
    }

    #[test]
    fn refill_rate() {
        let limits = RateLimitConfig {
            capacity: 90,
            window_secs: 900,
            ..RateLimitConfig::default()
        };
        assert!((limits.refill_per_sec() - 0.1).abs() < 1e-12);
    }
}
