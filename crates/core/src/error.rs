//! Unified error types for wayback-rewind.
//!
//! Layer-specific errors (index client, insight gateway, configuration)
//! collapse into this taxonomy before they reach a public surface.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Unified error types for the wayback-rewind services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Required request fields missing or malformed.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Upstream index or generation call exceeded its deadline.
    #[error("TIMEOUT: {0}")]
    Timeout(String),

    /// Upstream kept answering 429 after local retries were exhausted.
    #[error("RATE_LIMITED: {0}")]
    RateLimited(String),

    /// Snapshot index returned a non-2xx status or could not be reached.
    #[error("INDEX_UNAVAILABLE: {0}")]
    IndexUnavailable(String),

    /// Text generation service returned a non-2xx status or could not be reached.
    #[error("GENERATION_UNAVAILABLE: {0}")]
    GenerationUnavailable(String),

    /// Upstream payload did not have the expected shape.
    #[error("PARSE_FAILURE: {0}")]
    ParseFailure(String),

    /// Configuration could not be loaded or failed validation.
    #[error("CONFIG_ERROR: {0}")]
    Config(String),
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone()),
            Error::Timeout(msg) => (-32006, msg.clone()),
            Error::RateLimited(msg) => (-32010, msg.clone()),
            Error::IndexUnavailable(msg) => (-32008, msg.clone()),
            Error::GenerationUnavailable(msg) => (-32009, msg.clone()),
            Error::ParseFailure(msg) => (-32000, msg.clone()),
            Error::Config(msg) => (-32002, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::RateLimited("index still answering 429 after 4 attempts".to_string());
        assert!(err.to_string().starts_with("RATE_LIMITED: "));
        assert!(err.to_string().contains("4 attempts"));
    }

    #[test]
    fn test_error_to_mcp_error() {
        let err = Error::InvalidInput("url is required".to_string());
        let mcp_err: McpError = err.into();
        assert_eq!(mcp_err.code.0, -32602);
        assert_eq!(mcp_err.message, "url is required");
    }
}
