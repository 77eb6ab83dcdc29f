//! Error types for the directory client

/// Remote listing errors
///
/// `DirectoryClient::fetch_websites` swallows these and falls back; they
/// surface only through `try_fetch_websites`.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Client setup, transport, timeout or body decode failure
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-2xx status
    #[error("unexpected status {0}")]
    Status(u16),

    /// Envelope had `success: false`
    #[error("server reported an unsuccessful response")]
    Unsuccessful,

    /// Endpoint URL could not be built
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}
