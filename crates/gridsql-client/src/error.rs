// Error types for upstream access
use thiserror::Error;

/// Errors produced while talking to the upstream record store.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport-level failure: connection, TLS, timeout.
    #[error("upstream transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream answered with a non-success status.
    #[error("upstream api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The upstream answered 2xx but the body did not match the wire format.
    #[error("failed to decode upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}
