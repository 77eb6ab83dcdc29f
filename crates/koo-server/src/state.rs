//! Shared request state
//!
//! The directory sits behind a read-write lock; the recommendation store
//! behind a mutex so two first requests on a new day agree on one pick.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::rate_limiter::RateLimiter;
use chrono::NaiveDate;
use koo_core::filter::{filter, search_records};
use koo_core::{
    render, BusinessRecord, Clock, Directory, JsonFileStore, KeyValueStore, MemoryStore,
    RecommendError, RecommendationPicker, SystemClock,
};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::time::Instant;

/// Boxed store shared across requests
pub type SharedStore = Box<dyn KeyValueStore + Send>;

/// Boxed clock shared across requests
pub type SharedClock = Arc<dyn Clock + Send + Sync>;

/// State cloned into every route
#[derive(Clone)]
pub struct AppState {
    config: Arc<ServerConfig>,
    directory: Arc<RwLock<Directory>>,
    store: Arc<Mutex<SharedStore>>,
    picker: Arc<RecommendationPicker<SharedClock>>,
    limiter: Arc<RateLimiter>,
    started: Instant,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("records", &self.directory.read().len())
            .field("started", &self.started)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Create state from parts
    #[must_use]
    pub fn new(
        config: ServerConfig,
        directory: Directory,
        store: SharedStore,
        clock: SharedClock,
    ) -> Self {
        let picker = RecommendationPicker::new(clock).with_rules(config.site.validation);
        Self {
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            config: Arc::new(config),
            directory: Arc::new(RwLock::new(directory)),
            store: Arc::new(Mutex::new(store)),
            picker: Arc::new(picker),
            started: Instant::now(),
        }
    }

    /// Load directory and store as the config describes, on the system clock
    pub fn from_config(config: ServerConfig) -> Result<Self, ServerError> {
        let directory = match &config.data_file {
            Some(path) => Directory::load(path)?,
            None => Directory::bundled(),
        };
        let store: SharedStore = match &config.state_file {
            Some(path) => Box::new(JsonFileStore::open(path.clone())?),
            None => Box::new(MemoryStore::new()),
        };
        tracing::debug!("Directory ready with {} records", directory.len());
        Ok(Self::new(config, directory, store, Arc::new(SystemClock)))
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Every record, placeholders included
    #[must_use]
    pub fn records(&self) -> Vec<BusinessRecord> {
        self.directory.read().records().to_vec()
    }

    /// Records matching a search term
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<BusinessRecord> {
        search_records(self.directory.read().records(), term, &self.config.site)
    }

    /// Distinct categories of renderable records
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        self.directory.read().categories(&self.config.site.validation)
    }

    /// Today's pick and the date it is for
    pub fn recommendation(&self) -> Result<(NaiveDate, Option<BusinessRecord>), RecommendError> {
        let today = self.picker.today();
        let directory = self.directory.read();
        let mut store = self.store.lock();
        let pick = koo_core::recommend::get_daily_on(
            today,
            directory.records(),
            &self.config.site.validation,
            &mut *store,
            &mut rand::rng(),
        )?;
        Ok((today, pick))
    }

    /// Directory markup filtered by a term, with banner and live region
    #[must_use]
    pub fn directory_fragment(&self, term: &str) -> String {
        let rendered = render(self.directory.read().records(), &self.config.site);
        let outcome = filter(&rendered.cards, term, &self.config.site);
        rendered.to_html_filtered(&outcome)
    }

    /// Seconds since start
    #[must_use]
    pub fn uptime(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}
