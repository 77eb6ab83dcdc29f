//! KOOPAGES Server - directory API and static site
//!
//! Serves the public site directory plus a small JSON API:
//! - `GET /api/websites`, `/api/websites/search?q=`, `/api/categories`
//! - `GET /api/recommendation`, one pick per day shared by every client
//! - `GET /fragments/directory?q=` rendered cards with the no-results banner
//! - `GET /health`
//!
//! Requests are rate limited per IP; responses are gzip-compressed for
//! clients that accept it. `check_site` validates the static assets.
//!
//! # Example
//!
//! ```rust,ignore
//! use koo_server::{AppState, ServerConfig};
//!
//! let state = AppState::from_config(ServerConfig::load(None)?)?;
//! koo_server::run(state, async { tokio::signal::ctrl_c().await.ok(); }).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod rate_limiter;
pub mod routes;
pub mod site_check;
pub mod state;

pub use config::{CacheConfig, RateLimitConfig, ServerConfig};
pub use error::{ApiRejection, ServerError};
pub use rate_limiter::RateLimiter;
pub use routes::routes;
pub use site_check::{check_site, SiteCheck, SiteReport};
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Bind and serve until `shutdown` completes
///
/// Returns once the server has drained. The bound address is logged, which
/// matters when the configured port is 0.
pub async fn run(
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<SocketAddr, ServerError> {
    let addr = state.config().addr();
    let public = state.config().public_dir.display().to_string();
    let environment = state.config().environment.clone();

    let (bound, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, shutdown)
        .map_err(|e| ServerError::Bind {
            addr,
            message: e.to_string(),
        })?;

    tracing::info!(
        "KOOPAGES server listening on http://{} ({}), serving {}",
        bound,
        environment,
        public
    );
    server.await;
    tracing::info!("Server stopped");
    Ok(bound)
}
