//! Insight generator gateway.
//!
//! Wraps a remote chat-completion service behind the shared result cache.
//! The gateway never fails for upstream reasons: without a credential, or when
//! the remote call errors or times out, it answers with a deterministic
//! fallback and says so in [`InsightOutcome::source`].
//!
//! Two flavours:
//! - **Comparison**: structured JSON analysis of two snapshots, cached under
//!   the order-independent (url, date pair) key.
//! - **Timeline**: freeform text about a whole capture history.

pub mod error;
pub mod fallback;
pub mod prompt;
pub mod request;
pub mod response;

pub use error::InsightError;
pub use prompt::ChatMessage;
pub use request::{ComparisonRequest, ComparisonSide, DateRange, OrderedComparison, TimelineRequest};
pub use response::{ComparisonAnalysis, Sentiment};

use std::sync::Arc;
use std::time::Duration;

use rewind_core::cache::{generate_key, timeline_key};
use rewind_core::{AppConfig, ResultCache};
use serde::{Deserialize, Serialize};

use self::fallback::Reason;
use crate::normalize::normalize;
use crate::transport::{HttpRequest, Transport};

/// Default chat completion endpoint.
const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Text returned when a timeline completion carries no content.
const EMPTY_TIMELINE: &str = "Unable to generate insights.";

/// Insight gateway configuration.
#[derive(Clone)]
pub struct InsightConfig {
    /// Bearer credential. None selects the fallback path.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub comparison_model: String,
    pub timeline_model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub comparison_max_tokens: u32,
    pub timeline_max_tokens: u32,
}

impl std::fmt::Debug for InsightConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsightConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("endpoint", &self.endpoint)
            .field("comparison_model", &self.comparison_model)
            .field("timeline_model", &self.timeline_model)
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .field("comparison_max_tokens", &self.comparison_max_tokens)
            .field("timeline_max_tokens", &self.timeline_max_tokens)
            .finish()
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            comparison_model: "gpt-4o-mini".to_string(),
            timeline_model: "gpt-4-turbo-preview".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.7,
            comparison_max_tokens: 1_000,
            timeline_max_tokens: 500,
        }
    }
}

impl InsightConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            api_key: config
                .openai_api_key
                .as_deref()
                .map(str::trim)
                .filter(|key| !key.is_empty())
                .map(str::to_string),
            endpoint: config.insight_endpoint.clone(),
            comparison_model: config.comparison_model.clone(),
            timeline_model: config.timeline_model.clone(),
            timeout: config.insight_timeout(),
            temperature: config.insight_temperature,
            comparison_max_tokens: config.comparison_max_tokens,
            timeline_max_tokens: config.timeline_max_tokens,
        }
    }
}

/// Where an insight came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightSource {
    Cached,
    Live,
    Fallback,
}

/// An insight plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightOutcome<T> {
    pub value: T,
    pub source: InsightSource,
}

impl<T> InsightOutcome<T> {
    fn new(value: T, source: InsightSource) -> Self {
        Self { value, source }
    }

    pub fn cached(&self) -> bool {
        self.source == InsightSource::Cached
    }
}

/// Insight generator gateway.
#[derive(Debug, Clone)]
pub struct InsightGateway {
    transport: Arc<dyn Transport>,
    cache: ResultCache,
    config: InsightConfig,
}

impl InsightGateway {
    /// Create a new gateway.
    ///
    /// Fails if the configured endpoint is not an absolute http(s) URL.
    pub fn new(transport: Arc<dyn Transport>, cache: ResultCache, config: InsightConfig) -> Result<Self, InsightError> {
        let endpoint = url::Url::parse(&config.endpoint)
            .map_err(|e| InsightError::Config(format!("invalid insight endpoint {}: {e}", config.endpoint)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(InsightError::Config(format!("unsupported insight endpoint scheme: {}", endpoint.scheme())));
        }

        Ok(Self { transport, cache, config })
    }

    /// Whether live generation is configured.
    pub fn is_live(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Structured comparison of two snapshots.
    ///
    /// Only request validation can fail.
    pub async fn compare(&self, req: &ComparisonRequest) -> Result<InsightOutcome<ComparisonAnalysis>, InsightError> {
        let ordered = req.ordered()?;
        let key = generate_key(&normalize(&ordered.url), &ordered.earlier.date, &ordered.later.date);

        if let Some(analysis) = self.cache.get::<ComparisonAnalysis>(&key).await {
            tracing::debug!(url = %ordered.url, "comparison cache hit");
            return Ok(InsightOutcome::new(analysis, InsightSource::Cached));
        }

        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::debug!(url = %ordered.url, "no generation credential, using fallback comparison");
            let analysis = fallback::comparison(&ordered, Reason::NoCredential);
            return Ok(InsightOutcome::new(analysis, InsightSource::Fallback));
        };

        let messages = prompt::comparison_messages(&ordered);
        let result = self
            .complete(api_key, &self.config.comparison_model, &messages, self.config.comparison_max_tokens, true)
            .await;

        match result {
            Ok(content) => {
                let analysis = response::parse_analysis(content.as_deref().unwrap_or("{}"));
                if analysis.is_empty() {
                    tracing::warn!(url = %ordered.url, "empty comparison analysis, not caching");
                } else {
                    self.cache.set(&key, &analysis).await;
                }
                Ok(InsightOutcome::new(analysis, InsightSource::Live))
            }
            Err(e) => {
                tracing::error!(url = %ordered.url, error = %e, "comparison generation failed, using fallback");
                let analysis = fallback::comparison(&ordered, Reason::Unavailable);
                Ok(InsightOutcome::new(analysis, InsightSource::Fallback))
            }
        }
    }

    /// Freeform insights about a capture history.
    ///
    /// Only request validation can fail.
    pub async fn timeline(&self, req: &TimelineRequest) -> Result<InsightOutcome<String>, InsightError> {
        req.validate()?;
        let key = timeline_key(&normalize(&req.url), &req.date_range.oldest, &req.date_range.newest, req.snapshot_count);

        if let Some(text) = self.cache.get::<String>(&key).await {
            tracing::debug!(url = %req.url, "timeline insight cache hit");
            return Ok(InsightOutcome::new(text, InsightSource::Cached));
        }

        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::debug!(url = %req.url, "no generation credential, using fallback timeline");
            return Ok(InsightOutcome::new(fallback::timeline(req, Reason::NoCredential), InsightSource::Fallback));
        };

        let messages = prompt::timeline_messages(req);
        let result =
            self.complete(api_key, &self.config.timeline_model, &messages, self.config.timeline_max_tokens, false).await;

        match result {
            Ok(Some(text)) => {
                self.cache.set(&key, &text).await;
                Ok(InsightOutcome::new(text, InsightSource::Live))
            }
            Ok(None) => {
                tracing::warn!(url = %req.url, "timeline completion had no content");
                Ok(InsightOutcome::new(EMPTY_TIMELINE.to_string(), InsightSource::Live))
            }
            Err(e) => {
                tracing::error!(url = %req.url, error = %e, "timeline generation failed, using fallback");
                Ok(InsightOutcome::new(fallback::timeline(req, Reason::Unavailable), InsightSource::Fallback))
            }
        }
    }

    /// One chat completion call under the configured deadline. No retries.
    async fn complete(
        &self, api_key: &str, model: &str, messages: &[ChatMessage], max_tokens: u32, json_output: bool,
    ) -> Result<Option<String>, InsightError> {
        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": max_tokens,
        });
        if json_output {
            body["response_format"] = serde_json::json!({ "type": "json_object" });
        }

        let request = HttpRequest::post_json(self.config.endpoint.as_str(), body)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Accept", "application/json");

        let deadline = self.config.timeout;
        let response = match tokio::time::timeout(deadline, self.transport.execute(request)).await {
            Ok(result) => result.map_err(|e| InsightError::from_transport(e, deadline))?,
            Err(_) => return Err(InsightError::Timeout(deadline)),
        };

        if !response.is_success() {
            tracing::error!(status = response.status, body = %response.text(), "generation service request failed");
            return Err(InsightError::HttpError { status: response.status, body: response.text() });
        }

        response::completion_content(&response.body)
    }
}
