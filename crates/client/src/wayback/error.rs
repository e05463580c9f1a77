//! Snapshot index client error types.

use std::time::Duration;

use rewind_core::Error;

use crate::transport::TransportError;

/// Errors from the snapshot index client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum IndexError {
    /// Query parameters rejected before any request was made.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A single request exceeded its deadline. Not retried.
    #[error("index request timed out after {0:?}")]
    Timeout(Duration),

    /// The index kept answering 429 after every retry.
    #[error("rate limited: gave up after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// Non-2xx, non-429 response.
    #[error("HTTP error: {status}")]
    HttpError { status: u16, body: String },

    /// Connection-level failure. Not retried.
    #[error("network error: {0}")]
    Network(String),

    /// Body was not a JSON array of rows.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Client misconfiguration (e.g. unparseable endpoint).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IndexError {
    pub(crate) fn from_transport(err: TransportError, deadline: Duration) -> Self {
        match err {
            TransportError::Timeout => IndexError::Timeout(deadline),
            TransportError::Network(msg) => IndexError::Network(msg),
        }
    }
}

impl From<IndexError> for Error {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::InvalidQuery(msg) => Error::InvalidInput(msg),
            IndexError::Timeout(_) => Error::Timeout(err.to_string()),
            IndexError::RateLimited { .. } => Error::RateLimited(err.to_string()),
            IndexError::HttpError { status, .. } => Error::IndexUnavailable(format!("index returned HTTP {status}")),
            IndexError::Network(_) => Error::IndexUnavailable(err.to_string()),
            IndexError::InvalidResponse(_) => Error::ParseFailure(err.to_string()),
            IndexError::Config(_) => Error::Config(err.to_string()),
        }
    }
}
