//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (REWIND_*)
//! 2. The conventional OPENAI_API_KEY variable (generation credential only)
//! 3. TOML config file (if REWIND_CONFIG_FILE set)
//! 4. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::snapshot::Collapse;

mod validation;

pub use validation::ConfigError;

/// Which public surface the binary serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// MCP JSON-RPC over stdin/stdout.
    Stdio,
    /// JSON HTTP API.
    Http,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (REWIND_*)
/// 2. OPENAI_API_KEY
/// 3. TOML config file (if REWIND_CONFIG_FILE set)
/// 4. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Credential for the text generation service.
    ///
    /// Set via REWIND_OPENAI_API_KEY or OPENAI_API_KEY. When absent, insight
    /// requests are answered by the deterministic demo fallback.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Root of the archive used to build viewing and preview URLs.
    #[serde(default = "default_archive_base_url")]
    pub archive_base_url: String,

    /// Timestamp index search endpoint.
    #[serde(default = "default_index_endpoint")]
    pub index_endpoint: String,

    /// Deadline for a single index request in milliseconds.
    #[serde(default = "default_index_timeout_ms")]
    pub index_timeout_ms: u64,

    /// Retries after a 429 from the index before giving up.
    #[serde(default = "default_index_max_retries")]
    pub index_max_retries: u32,

    /// First backoff delay in milliseconds; doubles on each retry.
    #[serde(default = "default_index_backoff_base_ms")]
    pub index_backoff_base_ms: u64,

    /// Upper bound of the random jitter added to each backoff delay.
    #[serde(default = "default_index_backoff_jitter_ms")]
    pub index_backoff_jitter_ms: u64,

    /// Default collapse bucket for snapshot queries.
    #[serde(default)]
    pub collapse: Collapse,

    /// Default number of snapshots returned per query.
    #[serde(default = "default_snapshot_limit")]
    pub snapshot_limit: usize,

    /// Largest limit a caller may request.
    #[serde(default = "default_max_snapshot_limit")]
    pub max_snapshot_limit: usize,

    /// Chat completion endpoint for insight generation.
    #[serde(default = "default_insight_endpoint")]
    pub insight_endpoint: String,

    /// Model used for structured two-snapshot comparisons.
    #[serde(default = "default_comparison_model")]
    pub comparison_model: String,

    /// Model used for freeform timeline insights.
    #[serde(default = "default_timeline_model")]
    pub timeline_model: String,

    /// Deadline for a single generation request in milliseconds.
    #[serde(default = "default_insight_timeout_ms")]
    pub insight_timeout_ms: u64,

    /// Sampling temperature sent with every generation request.
    #[serde(default = "default_insight_temperature")]
    pub insight_temperature: f32,

    /// Token budget for comparison analyses.
    #[serde(default = "default_comparison_max_tokens")]
    pub comparison_max_tokens: u32,

    /// Token budget for timeline insights.
    #[serde(default = "default_timeline_max_tokens")]
    pub timeline_max_tokens: u32,

    /// Time-to-live of result cache entries in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Upper bound on live cache entries.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,

    /// Interval of the background expiry sweep in seconds (0 disables it).
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// User-Agent string for outbound HTTP requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Public surface served by the binary.
    #[serde(default = "default_transport")]
    pub transport: TransportMode,

    /// Bind address for the HTTP API.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_archive_base_url() -> String {
    "https://web.archive.org".into()
}

fn default_index_endpoint() -> String {
    "https://web.archive.org/cdx/search/cdx".into()
}

fn default_index_timeout_ms() -> u64 {
    30_000
}

fn default_index_max_retries() -> u32 {
    3
}

fn default_index_backoff_base_ms() -> u64 {
    2_000
}

fn default_index_backoff_jitter_ms() -> u64 {
    500
}

fn default_snapshot_limit() -> usize {
    30
}

fn default_max_snapshot_limit() -> usize {
    100
}

fn default_insight_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".into()
}

fn default_comparison_model() -> String {
    "gpt-4o-mini".into()
}

fn default_timeline_model() -> String {
    "gpt-4-turbo-preview".into()
}

fn default_insight_timeout_ms() -> u64 {
    30_000
}

fn default_insight_temperature() -> f32 {
    0.7
}

fn default_comparison_max_tokens() -> u32 {
    1_000
}

fn default_timeline_max_tokens() -> u32 {
    500
}

fn default_cache_ttl_secs() -> u64 {
    86_400 // 24h
}

fn default_cache_max_entries() -> usize {
    10_000
}

fn default_cache_sweep_interval_secs() -> u64 {
    600
}

fn default_user_agent() -> String {
    "wayback-rewind/0.1".into()
}

fn default_transport() -> TransportMode {
    TransportMode::Stdio
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            archive_base_url: default_archive_base_url(),
            index_endpoint: default_index_endpoint(),
            index_timeout_ms: default_index_timeout_ms(),
            index_max_retries: default_index_max_retries(),
            index_backoff_base_ms: default_index_backoff_base_ms(),
            index_backoff_jitter_ms: default_index_backoff_jitter_ms(),
            collapse: Collapse::default(),
            snapshot_limit: default_snapshot_limit(),
            max_snapshot_limit: default_max_snapshot_limit(),
            insight_endpoint: default_insight_endpoint(),
            comparison_model: default_comparison_model(),
            timeline_model: default_timeline_model(),
            insight_timeout_ms: default_insight_timeout_ms(),
            insight_temperature: default_insight_temperature(),
            comparison_max_tokens: default_comparison_max_tokens(),
            timeline_max_tokens: default_timeline_max_tokens(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
            cache_sweep_interval_secs: default_cache_sweep_interval_secs(),
            user_agent: default_user_agent(),
            transport: default_transport(),
            listen_addr: default_listen_addr(),
        }
    }
}

impl AppConfig {
    /// Index request deadline as Duration.
    pub fn index_timeout(&self) -> Duration {
        Duration::from_millis(self.index_timeout_ms)
    }

    /// First retry delay as Duration.
    pub fn index_backoff_base(&self) -> Duration {
        Duration::from_millis(self.index_backoff_base_ms)
    }

    /// Maximum jitter as Duration.
    pub fn index_backoff_jitter(&self) -> Duration {
        Duration::from_millis(self.index_backoff_jitter_ms)
    }

    /// Generation request deadline as Duration.
    pub fn insight_timeout(&self) -> Duration {
        Duration::from_millis(self.insight_timeout_ms)
    }

    /// Cache entry lifetime as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Sweep interval, or None when the sweeper is disabled.
    pub fn cache_sweep_interval(&self) -> Option<Duration> {
        (self.cache_sweep_interval_secs > 0).then(|| Duration::from_secs(self.cache_sweep_interval_secs))
    }

    /// Whether a generation credential is configured.
    pub fn has_generation_credential(&self) -> bool {
        self.openai_api_key.as_deref().is_some_and(|key| !key.trim().is_empty())
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `REWIND_`
    /// 2. `OPENAI_API_KEY`
    /// 3. TOML file from `REWIND_CONFIG_FILE` (if set)
    /// 4. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("REWIND_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment
            .merge(Env::raw().only(&["OPENAI_API_KEY"]).map(|key| key.as_str().to_lowercase().into()))
            .merge(
                Env::prefixed("REWIND_")
                    .ignore(&["CONFIG_FILE"])
                    .map(|key| key.as_str().to_lowercase().into())
                    .split("__"),
            );

        Self::from_figment(figment)
    }

    /// Extract and validate configuration from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::LoadFailed` if extraction fails, or the
    /// validation error if a value is out of range.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.archive_base_url, "https://web.archive.org");
        assert_eq!(config.index_endpoint, "https://web.archive.org/cdx/search/cdx");
        assert_eq!(config.index_max_retries, 3);
        assert_eq!(config.collapse, Collapse::Day);
        assert_eq!(config.snapshot_limit, 30);
        assert_eq!(config.cache_ttl_secs, 86_400);
        assert_eq!(config.transport, TransportMode::Stdio);
        assert!(config.openai_api_key.is_none());
    }

    #[test]
    fn test_durations() {
        let config = AppConfig::default();
        assert_eq!(config.index_timeout(), Duration::from_secs(30));
        assert_eq!(config.index_backoff_base(), Duration::from_secs(2));
        assert_eq!(config.cache_ttl(), Duration::from_secs(24 * 60 * 60));
        assert_eq!(config.cache_sweep_interval(), Some(Duration::from_secs(600)));
    }

    #[test]
    fn test_sweeper_disabled() {
        let config = AppConfig { cache_sweep_interval_secs: 0, ..Default::default() };
        assert!(config.cache_sweep_interval().is_none());
    }

    #[test]
    fn test_generation_credential() {
        assert!(!AppConfig::default().has_generation_credential());

        let blank = AppConfig { openai_api_key: Some("  ".into()), ..Default::default() };
        assert!(!blank.has_generation_credential());

        let set = AppConfig { openai_api_key: Some("sk-test".into()), ..Default::default() };
        assert!(set.has_generation_credential());
    }

    #[test]
    fn test_from_figment_overrides() {
        let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string(
            r#"
            collapse = "month"
            snapshot_limit = 50
            transport = "http"
            "#,
        ));

        let config = AppConfig::from_figment(figment).unwrap();
        assert_eq!(config.collapse, Collapse::Month);
        assert_eq!(config.snapshot_limit, 50);
        assert_eq!(config.transport, TransportMode::Http);
    }

    #[test]
    fn test_from_figment_rejects_invalid() {
        let figment =
            Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::string("snapshot_limit = 0"));
        assert!(matches!(AppConfig::from_figment(figment), Err(ConfigError::Invalid { .. })));
    }
}
