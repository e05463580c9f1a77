//! Snapshot index client.
//!
//! Queries the archive's timestamp index for one normalized URL and turns the
//! tabular answer into a deduplicated, sorted, capped snapshot list.
//!
//! ### Behavior
//!
//! - **Deadline**: every attempt runs under [`IndexConfig::timeout`]. An
//!   attempt that misses it is cancelled and fails with
//!   [`IndexError::Timeout`]. Timeouts are never retried.
//! - **Rate limiting**: HTTP 429 is retried up to `max_retries` times with
//!   exponential backoff (`base * 2^attempt`) plus uniform random jitter in
//!   `[0, backoff_jitter]`, then fails with [`IndexError::RateLimited`].
//! - **Other statuses**: any other non-2xx fails immediately with
//!   [`IndexError::HttpError`]; the body is logged, never surfaced.
//! - **Parsing**: malformed rows are dropped and counted in
//!   [`SnapshotBatch::skipped`].

pub mod dedupe;
pub mod error;
pub mod request;
pub mod response;
pub mod service;

pub use dedupe::finalize;
pub use error::IndexError;
pub use request::{DEFAULT_LIMIT, SnapshotQuery};
pub use response::{ParsedRows, parse_rows};
pub use service::{SnapshotListing, SnapshotService};

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use rewind_core::{AppConfig, ArchiveRoot, RenderMode, Snapshot};
use serde::{Deserialize, Serialize};

use crate::transport::{HttpResponse, Transport};

/// Default timestamp index endpoint.
const DEFAULT_ENDPOINT: &str = "https://web.archive.org/cdx/search/cdx";

/// Default per-attempt deadline.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of 429 retries.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// First backoff delay; doubles on each retry.
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(2);

/// Upper bound of the random jitter added to each delay.
const DEFAULT_BACKOFF_JITTER: Duration = Duration::from_millis(500);

/// Largest accepted limit.
const DEFAULT_MAX_LIMIT: usize = 100;

/// Index client configuration.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Timestamp index search endpoint.
    pub endpoint: String,
    /// Root used to build viewing and preview URLs.
    pub archive_root: ArchiveRoot,
    /// Rendering modifier for preview URLs.
    pub preview: RenderMode,
    /// Per-attempt deadline.
    pub timeout: Duration,
    /// Retries after a 429 before giving up.
    pub max_retries: u32,
    pub backoff_base: Duration,
    pub backoff_jitter: Duration,
    /// Largest limit a query may ask for.
    pub max_limit: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            archive_root: ArchiveRoot::default(),
            preview: RenderMode::default(),
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base: DEFAULT_BACKOFF_BASE,
            backoff_jitter: DEFAULT_BACKOFF_JITTER,
            max_limit: DEFAULT_MAX_LIMIT,
        }
    }
}

impl IndexConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            endpoint: config.index_endpoint.clone(),
            archive_root: ArchiveRoot::new(config.archive_base_url.as_str()),
            preview: RenderMode::default(),
            timeout: config.index_timeout(),
            max_retries: config.index_max_retries,
            backoff_base: config.index_backoff_base(),
            backoff_jitter: config.index_backoff_jitter(),
            max_limit: config.max_snapshot_limit,
        }
    }

    /// Delay before retry number `attempt` (0-based), jitter excluded.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Result of one index query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotBatch {
    /// Normalized URL that was queried.
    pub url: String,
    /// Deduplicated, sorted, capped snapshots.
    pub snapshots: Vec<Snapshot>,
    /// Rows dropped as malformed.
    pub skipped: usize,
}

/// Snapshot index client.
#[derive(Debug, Clone)]
pub struct IndexClient {
    transport: Arc<dyn Transport>,
    config: IndexConfig,
}

impl IndexClient {
    /// Create a new index client.
    ///
    /// Fails if the configured endpoint is not an absolute http(s) URL.
    pub fn new(transport: Arc<dyn Transport>, config: IndexConfig) -> Result<Self, IndexError> {
        let endpoint = url::Url::parse(&config.endpoint)
            .map_err(|e| IndexError::Config(format!("invalid index endpoint {}: {e}", config.endpoint)))?;

        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(IndexError::Config(format!("unsupported index endpoint scheme: {}", endpoint.scheme())));
        }

        Ok(Self { transport, config })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Fetch the snapshot list for an already-normalized URL.
    pub async fn fetch_snapshots(&self, query: &SnapshotQuery) -> Result<SnapshotBatch, IndexError> {
        query.validate(self.config.max_limit)?;

        tracing::debug!(url = %query.url, limit = query.limit, collapse = %query.collapse, "querying snapshot index");

        let response = self.execute_with_retry(query).await?;
        let parsed = parse_rows(&response.body, &self.config.archive_root, self.config.preview)?;

        if parsed.skipped > 0 {
            tracing::warn!(url = %query.url, skipped = parsed.skipped, "dropped malformed index rows");
        }

        let snapshots = finalize(parsed.snapshots, query.collapse, query.order, query.limit);

        tracing::debug!(url = %query.url, count = snapshots.len(), "snapshot index query complete");

        Ok(SnapshotBatch { url: query.url.clone(), snapshots, skipped: parsed.skipped })
    }

    async fn execute_with_retry(&self, query: &SnapshotQuery) -> Result<HttpResponse, IndexError> {
        let request = query.to_request(&self.config.endpoint);
        let deadline = self.config.timeout;
        let mut retries = 0;

        loop {
            let response = match tokio::time::timeout(deadline, self.transport.execute(request.clone())).await {
                Ok(result) => result.map_err(|e| IndexError::from_transport(e, deadline))?,
                Err(_) => {
                    tracing::warn!(url = %query.url, ?deadline, "snapshot index timed out");
                    return Err(IndexError::Timeout(deadline));
                }
            };

            if response.status == 429 {
                if retries >= self.config.max_retries {
                    tracing::warn!(url = %query.url, attempts = retries + 1, "snapshot index still rate limited, giving up");
                    return Err(IndexError::RateLimited { attempts: retries + 1 });
                }

                let delay = self.config.backoff_delay(retries) + self.jitter();
                tracing::warn!(url = %query.url, retry = retries + 1, ?delay, "snapshot index rate limited, backing off");
                tokio::time::sleep(delay).await;
                retries += 1;
                continue;
            }

            if !response.is_success() {
                tracing::error!(url = %query.url, status = response.status, body = %response.text(), "snapshot index request failed");
                return Err(IndexError::HttpError { status: response.status, body: response.text() });
            }

            return Ok(response);
        }
    }

    fn jitter(&self) -> Duration {
        let max = u64::try_from(self.config.backoff_jitter.as_millis()).unwrap_or(u64::MAX);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }
}
