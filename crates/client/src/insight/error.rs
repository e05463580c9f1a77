//! Insight gateway error types.

use std::time::Duration;

use rewind_core::Error;

use crate::transport::TransportError;

/// Errors from the insight generation gateway.
///
/// Only [`InsightError::InvalidRequest`] and [`InsightError::Config`] ever
/// reach callers of the gateway; the remote failures are logged and replaced
/// by the deterministic fallback.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InsightError {
    /// Required request fields missing or blank.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The generation call exceeded its deadline.
    #[error("generation request timed out after {0:?}")]
    Timeout(Duration),

    /// Non-2xx response from the generation service.
    #[error("HTTP error: {status}")]
    HttpError { status: u16, body: String },

    /// Connection-level failure.
    #[error("network error: {0}")]
    Network(String),

    /// The completion envelope did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Gateway misconfiguration (e.g. unparseable endpoint).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl InsightError {
    pub(crate) fn from_transport(err: TransportError, deadline: Duration) -> Self {
        match err {
            TransportError::Timeout => InsightError::Timeout(deadline),
            TransportError::Network(msg) => InsightError::Network(msg),
        }
    }
}

impl From<InsightError> for Error {
    fn from(err: InsightError) -> Self {
        match err {
            InsightError::InvalidRequest(msg) => Error::InvalidInput(msg),
            InsightError::Timeout(_) => Error::Timeout(err.to_string()),
            InsightError::HttpError { status, .. } => {
                Error::GenerationUnavailable(format!("generation service returned HTTP {status}"))
            }
            InsightError::Network(_) => Error::GenerationUnavailable(err.to_string()),
            InsightError::InvalidResponse(_) => Error::ParseFailure(err.to_string()),
            InsightError::Config(_) => Error::Config(err.to_string()),
        }
    }
}
