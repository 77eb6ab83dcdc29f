//! KOOPAGES Core - sponsored business directory
//!
//! Everything the directory page does, without a DOM:
//! - Business records, validation and the bundled data store
//! - Card rendering with HTML escaping
//! - Diacritic-insensitive search with a debounced filter pass
//! - One recommendation per calendar day, persisted through a typed key-value store
//! - Section navigation, mobile menu and transient notifications
//! - A single-threaded controller (`DirectoryApp`) and its tokio driver
//!
//! # Example
//!
//! ```rust,ignore
//! use koo_core::prelude::*;
//!
//! let mut app = DirectoryApp::new(SiteConfig::default(), Directory::bundled());
//! app.initialize(Some("#negocios"));
//!
//! app.handle(UiEvent::SearchInput("salon".into()));
//! app.advance(std::time::Duration::from_millis(300));
//!
//! println!("{} cards visible", app.view().visible_count());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod api;
pub mod app;
pub mod config;
pub mod directory;
pub mod error;
pub mod filter;
pub mod navigation;
pub mod notify;
pub mod record;
pub mod recommend;
pub mod render;
pub mod runtime;
pub mod store;
pub mod text;
pub mod timer;
pub mod validation;

// Re-exports for convenience
pub use app::{AppTimer, DirectoryApp, PageLayout, PageView, RecommendationView, UiEvent, VisitOutcome};
pub use config::SiteConfig;
pub use directory::Directory;
pub use error::{
    ConfigError, DirectoryError, NavigationError, RecommendError, RuntimeError, StoreError,
};
pub use filter::{filter, FilterOutcome, NoResultsBanner};
pub use navigation::{NavigationController, Transition};
pub use notify::{Notification, NotificationCenter, NotificationId, NotificationKind};
pub use record::{BusinessRecord, DailyRecommendation, PLACEHOLDER_URL};
pub use recommend::{Clock, FixedClock, RecommendationPicker, SystemClock};
pub use render::{render, Card, RenderedDirectory};
pub use runtime::{spawn_app, AppHandle};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
pub use timer::{Debouncer, TimerId, TimerQueue};
pub use validation::{validate, ValidationReport, ValidationRules};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the directory controller
    pub use crate::{
        BusinessRecord, Directory, DirectoryApp, KeyValueStore, MemoryStore, NotificationKind,
        PageLayout, PageView, RecommendationPicker, SiteConfig, UiEvent,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn bundled_directory_flow() {
        let mut app = DirectoryApp::new(SiteConfig::default(), Directory::bundled());
        app.initialize(None);

        let total = app.view().visible_count();
        assert!(total > 0);

        app.handle(UiEvent::SearchInput("aly".to_string()));
        app.advance(Duration::from_millis(300));

        let view = app.view();
        assert_eq!(view.visible_count(), 1);
        assert!(view.banner.is_none());
    }
}
