//! Remote directory client
//!
//! Listings are cached under a single key with a time-to-live; the cache
//! is rebuilt when the TTL changes.

use crate::error::ClientError;
use koo_core::api::ApiResponse;
use koo_core::directory::bundled_records;
use koo_core::BusinessRecord;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const WEBSITES_KEY: &str = "websites";

/// Client settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server root; `api/websites` is resolved against it
    pub base_url: Url,
    /// Timeout for status probes
    pub timeout: Duration,
    /// Lifetime of a cached listing
    pub cache_ttl: Duration,
}

impl ClientConfig {
    /// Create config with default timeout (10 s) and cache TTL (5 min)
    #[must_use]
    pub fn new(mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            cache_ttl: Duration::from_secs(5 * 60),
        }
    }

    /// With status probe timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// With cache TTL
    #[inline]
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}

/// Cached, fail-safe client for the directory listing
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: reqwest::Client,
    config: ClientConfig,
    cache: Cache<&'static str, Arc<Vec<BusinessRecord>>>,
    fallback: Arc<Vec<BusinessRecord>>,
}

impl DirectoryClient {
    /// Create client with the bundled list as fallback
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("koopages/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            cache: build_cache(config.cache_ttl),
            config,
            fallback: Arc::new(bundled_records()),
        })
    }

    /// With custom fallback records
    #[must_use]
    pub fn with_fallback(mut self, records: Vec<BusinessRecord>) -> Self {
        self.fallback = Arc::new(records);
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Records from the server, the cache, or the fallback list
    ///
    /// Never fails: any error is logged and the fallback is returned.
    /// Fallback results are not cached.
    pub async fn fetch_websites(&self) -> Vec<BusinessRecord> {
        match self.try_fetch_websites().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Error fetching websites, using bundled list: {}", e);
                self.fallback.as_ref().clone()
            }
        }
    }

    /// Records from the cache or the server
    pub async fn try_fetch_websites(&self) -> Result<Vec<BusinessRecord>, ClientError> {
        if let Some(cached) = self.cache.get(WEBSITES_KEY).await {
            tracing::debug!("Serving {} websites from cache", cached.len());
            return Ok(cached.as_ref().clone());
        }

        let url = self.config.base_url.join("api/websites")?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: ApiResponse<Vec<BusinessRecord>> = response.json().await?;
        if !body.success {
            return Err(ClientError::Unsuccessful);
        }

        tracing::debug!("Fetched {} websites", body.data.len());
        let records = Arc::new(body.data);
        self.cache.insert(WEBSITES_KEY, Arc::clone(&records)).await;
        Ok(records.as_ref().clone())
    }

    /// Probe a site with a HEAD request
    ///
    /// Any HTTP answer counts as reachable; transport errors and timeouts
    /// do not.
    pub async fn check_status(&self, url: &str) -> bool {
        match self.http.head(url).timeout(self.config.timeout).send().await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Website status check failed for {}: {}", url, e);
                false
            }
        }
    }

    /// Drop the cached listing
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    /// Change the cache TTL; the current cache is discarded
    pub fn set_cache_ttl(&mut self, ttl: Duration) {
        self.config.cache_ttl = ttl;
        self.cache = build_cache(ttl);
    }
}

fn build_cache(ttl: Duration) -> Cache<&'static str, Arc<Vec<BusinessRecord>>> {
    Cache::builder().max_capacity(1).time_to_live(ttl).build()
}
