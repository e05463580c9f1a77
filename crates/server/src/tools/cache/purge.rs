//! cache_purge tool implementation.
//!
//! Purges cache entries by key, by expiry, or entirely.

use rewind_core::{Error, ResultCache};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::tools::json_result;

/// Parameters for the cache_purge tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeParams {
    /// Remove the entry with this exact key.
    #[serde(default)]
    pub key: Option<String>,

    /// Remove every expired entry.
    #[serde(default)]
    pub expired: bool,

    /// Remove everything.
    #[serde(default)]
    pub all: bool,
}

/// Output from the cache_purge tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CachePurgeOutput {
    /// Number of entries deleted.
    pub deleted: usize,
}

/// Implementation of the cache_purge tool.
pub async fn purge_impl(cache: &ResultCache, params: CachePurgeParams) -> Result<CallToolResult, McpError> {
    if params.key.is_none() && !params.expired && !params.all {
        return Err(Error::InvalidInput("At least one of key, expired, or all must be specified".to_string()).into());
    }

    let mut deleted = 0;

    if let Some(key) = &params.key
        && cache.remove(key).await
    {
        deleted += 1;
    }

    if params.expired {
        deleted += cache.cleanup().await;
    }

    if params.all {
        deleted += cache.clear().await;
    }

    tracing::info!(deleted, "cache purged");

    json_result(&CachePurgeOutput { deleted })
}
