//! HTTP error envelope for the JSON API.
//!
//! Every failure becomes `{"error": "<message>"}` with a status chosen by
//! error kind. Upstream detail is logged here and never sent to the caller.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rewind_core::Error;
use serde::Serialize;

const SLOW_ARCHIVE: &str = "The Wayback Machine is responding slowly right now. Please try again in a moment.";
const BUSY_ARCHIVE: &str = "The Wayback Machine is rate limiting requests right now. Please try again shortly.";
const ARCHIVE_FAILED: &str = "Failed to fetch snapshots from the Wayback Machine.";
const GENERATION_FAILED: &str = "Failed to generate insights.";
const INTERNAL: &str = "Internal server error.";

/// `{"error": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An [`Error`] headed for an HTTP caller.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub Error);

impl ApiError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self(Error::InvalidInput(message.into()))
    }

    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Error::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Error::IndexUnavailable(_) | Error::GenerationUnavailable(_) | Error::ParseFailure(_) | Error::Config(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show to the caller.
    pub fn public_message(&self) -> String {
        match &self.0 {
            Error::InvalidInput(msg) => msg.clone(),
            Error::Timeout(_) => SLOW_ARCHIVE.to_string(),
            Error::RateLimited(_) => BUSY_ARCHIVE.to_string(),
            Error::IndexUnavailable(_) | Error::ParseFailure(_) => ARCHIVE_FAILED.to_string(),
            Error::GenerationUnavailable(_) => GENERATION_FAILED.to_string(),
            Error::Config(_) => INTERNAL.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            tracing::warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let mut response = Json(ErrorResponse { error: self.public_message() }).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::invalid("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError(Error::Timeout("t".into())).status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ApiError(Error::RateLimited("r".into())).status_code(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ApiError(Error::IndexUnavailable("i".into())).status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_public_message_hides_detail() {
        let err = ApiError(Error::IndexUnavailable("index returned HTTP 502".into()));
        assert_eq!(err.public_message(), ARCHIVE_FAILED);

        let err = ApiError(Error::Timeout("index request timed out after 30s".into()));
        assert_eq!(err.public_message(), SLOW_ARCHIVE);

        let err = ApiError::invalid("URL parameter is required");
        assert_eq!(err.public_message(), "URL parameter is required");
    }
}
