//! Shared application state for both public surfaces.

use std::sync::Arc;

use rewind_client::{IndexClient, IndexConfig, InsightConfig, InsightGateway, SnapshotService, Transport};
use rewind_core::{AppConfig, Error, ResultCache};

/// Everything a request handler needs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: ResultCache,
    pub snapshots: SnapshotService,
    pub insights: InsightGateway,
}

impl AppState {
    /// Wire the cache, index client, and insight gateway over one transport.
    pub fn new(config: AppConfig, transport: Arc<dyn Transport>) -> Result<Self, Error> {
        let cache = ResultCache::new(config.cache_ttl(), Some(config.cache_max_entries));
        Self::with_cache(config, transport, cache)
    }

    pub fn with_cache(config: AppConfig, transport: Arc<dyn Transport>, cache: ResultCache) -> Result<Self, Error> {
        let index = IndexClient::new(transport.clone(), IndexConfig::from_app_config(&config))?;
        let snapshots = SnapshotService::new(index, cache.clone(), config.snapshot_limit, config.collapse);
        let insights = InsightGateway::new(transport, cache.clone(), InsightConfig::from_app_config(&config))?;

        Ok(Self { config: Arc::new(config), cache, snapshots, insights })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::time::Duration;

    use rewind_client::testing::{Reply, ScriptedTransport};

    use super::*;

    pub const INDEX_BODY: &str = r#"[
        ["timestamp", "original", "mimetype", "statuscode"],
        ["20100105093000", "http://www.example.com/", "text/html", "200"],
        ["20150612110000", "http://example.com/", "text/html", "200"],
        ["20200305142233", "https://example.com/", "text/html", "200"]
    ]"#;

    /// State over a scripted transport with jitter disabled and no credential.
    pub fn state(replies: Vec<Reply>) -> (AppState, Arc<ScriptedTransport>) {
        state_with(replies, AppConfig { index_backoff_jitter_ms: 0, ..Default::default() })
    }

    pub fn state_with(replies: Vec<Reply>, config: AppConfig) -> (AppState, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(replies));
        let cache = ResultCache::new(Duration::from_secs(60), Some(100));
        let state = AppState::with_cache(config, transport.clone(), cache).unwrap();
        (state, transport)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rewind_client::testing::ScriptedTransport;

    #[test]
    fn test_rejects_bad_endpoint() {
        let config = AppConfig { index_endpoint: "not a url".into(), ..Default::default() };
        let result = AppState::new(config, Arc::new(ScriptedTransport::default()));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_cache_shared_between_services() {
        let (state, _) = test_support::state(vec![rewind_client::testing::Reply::ok(test_support::INDEX_BODY)]);
        state
            .snapshots
            .list("example.com", None, None, Default::default())
            .await
            .unwrap();
        assert_eq!(state.cache.len().await, 1);
    }
}
