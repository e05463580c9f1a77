//! Cached snapshot listing.

use rewind_core::cache::snapshots_key;
use rewind_core::{Collapse, ResultCache, SortOrder};
use serde::Serialize;

use super::{IndexClient, IndexError, SnapshotBatch, SnapshotQuery};
use crate::normalize::normalize;

/// A snapshot batch plus whether it came from the cache.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotListing {
    #[serde(flatten)]
    pub batch: SnapshotBatch,
    pub cached: bool,
}

/// Normalizes input, consults the result cache, and falls through to the index.
#[derive(Debug, Clone)]
pub struct SnapshotService {
    client: IndexClient,
    cache: ResultCache,
    default_limit: usize,
    default_collapse: Collapse,
}

impl SnapshotService {
    pub fn new(client: IndexClient, cache: ResultCache, default_limit: usize, default_collapse: Collapse) -> Self {
        Self { client, cache, default_limit, default_collapse }
    }

    /// List snapshots for a raw, user-supplied site URL.
    ///
    /// `limit` and `collapse` fall back to the configured defaults. Only
    /// successful batches are cached; errors always reach the index again on
    /// the next call.
    pub async fn list(
        &self, raw_url: &str, limit: Option<usize>, collapse: Option<Collapse>, order: SortOrder,
    ) -> Result<SnapshotListing, IndexError> {
        let url = normalize(raw_url);
        if url.is_empty() {
            return Err(IndexError::InvalidQuery("URL parameter is required".to_string()));
        }

        let query = SnapshotQuery::new(url)
            .with_limit(limit.unwrap_or(self.default_limit))
            .with_collapse(collapse.unwrap_or(self.default_collapse))
            .with_order(order);

        query.validate(self.client.config().max_limit)?;

        let key = snapshots_key(&query.url, query.limit, query.collapse, query.order);

        if let Some(batch) = self.cache.get::<SnapshotBatch>(&key).await {
            tracing::debug!(url = %query.url, "snapshot cache hit");
            return Ok(SnapshotListing { batch, cached: true });
        }

        let batch = self.client.fetch_snapshots(&query).await?;
        self.cache.set(&key, &batch).await;

        Ok(SnapshotListing { batch, cached: false })
    }
}
