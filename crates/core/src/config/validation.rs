//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

fn check_timeout(field: &str, value: u64) -> Result<(), ConfigError> {
    if value < 100 {
        return Err(invalid(field, "must be at least 100ms"));
    }
    if value > 300_000 {
        return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
    }
    Ok(())
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(())
    } else {
        Err(invalid(field, "must be an http(s) URL"))
    }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - a timeout is under 100ms or over 5 minutes
    /// - `index_max_retries` exceeds 10
    /// - `snapshot_limit` is 0 or exceeds `max_snapshot_limit`
    /// - `insight_temperature` is outside [0, 2]
    /// - a token budget, the cache TTL or `cache_max_entries` is 0
    /// - an endpoint is not an http(s) URL
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_timeout("index_timeout_ms", self.index_timeout_ms)?;
        check_timeout("insight_timeout_ms", self.insight_timeout_ms)?;

        if self.index_max_retries > 10 {
            return Err(invalid("index_max_retries", "must not exceed 10"));
        }

        if self.snapshot_limit == 0 {
            return Err(invalid("snapshot_limit", "must be greater than 0"));
        }
        if self.snapshot_limit > self.max_snapshot_limit {
            return Err(invalid("snapshot_limit", "must not exceed max_snapshot_limit"));
        }

        if !(0.0..=2.0).contains(&self.insight_temperature) {
            return Err(invalid("insight_temperature", "must be between 0 and 2"));
        }
        if self.comparison_max_tokens == 0 {
            return Err(invalid("comparison_max_tokens", "must be greater than 0"));
        }
        if self.timeline_max_tokens == 0 {
            return Err(invalid("timeline_max_tokens", "must be greater than 0"));
        }

        if self.cache_ttl_secs == 0 {
            return Err(invalid("cache_ttl_secs", "must be greater than 0"));
        }
        if self.cache_max_entries == 0 {
            return Err(invalid("cache_max_entries", "must be greater than 0"));
        }

        check_http_url("archive_base_url", &self.archive_base_url)?;
        check_http_url("index_endpoint", &self.index_endpoint)?;
        check_http_url("insight_endpoint", &self.insight_endpoint)?;

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.index_backoff_jitter_ms > self.index_backoff_base_ms {
            tracing::warn!(
                jitter_ms = self.index_backoff_jitter_ms,
                base_ms = self.index_backoff_base_ms,
                "backoff jitter exceeds the base delay; retry delays may not grow monotonically"
            );
        }

        Ok(())
    }
}
