//! KOOPAGES Client - remote directory listing
//!
//! Fetches `GET /api/websites` from a KOOPAGES server:
//! - Successful listings are cached (5 minutes by default)
//! - Any failure falls back to the bundled business list
//! - `check_status` probes a business site with a HEAD request
//!
//! # Example
//!
//! ```rust,ignore
//! use koo_client::{ClientConfig, DirectoryClient};
//!
//! let client = DirectoryClient::new(ClientConfig::new("http://localhost:3000".parse()?))?;
//! let records = client.fetch_websites().await;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod error;

pub use client::{ClientConfig, DirectoryClient};
pub use error::ClientError;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
