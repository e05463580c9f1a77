//! wayback_snapshots tool implementation.
//!
//! Lists archived captures of a site, newest first by default.

use rewind_client::SnapshotService;
use rewind_core::snapshot::{YearGroup, group_by_year};
use rewind_core::{Collapse, Error, Snapshot, SortOrder};
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the wayback_snapshots tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WaybackSnapshotsParams {
    /// Site URL (required). Scheme, `www.` and a trailing slash are ignored.
    pub url: String,

    /// Maximum number of snapshots (default 30, max 100).
    #[serde(default)]
    pub limit: Option<usize>,

    /// One snapshot per `day` (default) or per `month`.
    #[serde(default)]
    pub collapse: Option<Collapse>,

    /// `newest` (default) or `oldest` first.
    #[serde(default)]
    pub order: Option<SortOrder>,

    /// Also return the snapshots grouped by capture year.
    #[serde(default)]
    pub group_by_year: bool,
}

/// Output structure for the wayback_snapshots tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WaybackSnapshotsOutput {
    /// Normalized URL that was queried.
    pub url: String,
    pub count: usize,
    /// Whether the list was served from the result cache.
    pub cached: bool,
    /// Malformed index rows that were dropped.
    pub skipped: usize,
    pub snapshots: Vec<Snapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<YearGroup>>,
}

/// List snapshots and shape them for output.
pub async fn list_snapshots(
    service: &SnapshotService, params: WaybackSnapshotsParams,
) -> Result<WaybackSnapshotsOutput, Error> {
    let listing = service
        .list(&params.url, params.limit, params.collapse, params.order.unwrap_or_default())
        .await?;

    let batch = listing.batch;
    let years = params.group_by_year.then(|| group_by_year(&batch.snapshots));

    Ok(WaybackSnapshotsOutput {
        url: batch.url,
        count: batch.snapshots.len(),
        cached: listing.cached,
        skipped: batch.skipped,
        snapshots: batch.snapshots,
        years,
    })
}

/// Implementation of the wayback_snapshots tool.
pub async fn snapshots_impl(
    service: &SnapshotService, params: WaybackSnapshotsParams,
) -> Result<CallToolResult, McpError> {
    let output = list_snapshots(service, params).await?;
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{INDEX_BODY, state};
    use crate::tools::output_json;
    use rewind_client::testing::Reply;

    #[tokio::test]
    async fn test_snapshots_impl() {
        let (state, _) = state(vec![Reply::ok(INDEX_BODY)]);
        let params = WaybackSnapshotsParams { url: "https://www.Example.com/".into(), ..Default::default() };

        let result = snapshots_impl(&state.snapshots, params).await.unwrap();
        let output = output_json(&result);

        assert_eq!(output["url"], "example.com");
        assert_eq!(output["count"], 3);
        assert_eq!(output["cached"], false);
        assert_eq!(output["snapshots"][0]["timestamp"], "20200305142233");
        assert_eq!(output["snapshots"][0]["displayDate"], "Mar 5, 2020");
        assert!(output.get("years").is_none());
    }

    #[tokio::test]
    async fn test_group_by_year() {
        let (state, _) = state(vec![Reply::ok(INDEX_BODY)]);
        let params = WaybackSnapshotsParams {
            url: "example.com".into(),
            order: Some(SortOrder::Oldest),
            group_by_year: true,
            ..Default::default()
        };

        let output = list_snapshots(&state.snapshots, params).await.unwrap();
        let years: Vec<i32> = output.years.unwrap().iter().map(|g| g.year).collect();
        assert_eq!(years, vec![2010, 2015, 2020]);
    }

    #[tokio::test]
    async fn test_empty_url() {
        let (state, transport) = state(vec![Reply::ok(INDEX_BODY)]);
        let result = snapshots_impl(&state.snapshots, WaybackSnapshotsParams::default()).await;

        let err = result.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_maps_to_error_code() {
        let (state, transport) = state(vec![Reply::status(429)]);
        let params = WaybackSnapshotsParams { url: "example.com".into(), ..Default::default() };

        let err = snapshots_impl(&state.snapshots, params).await.unwrap_err();
        assert_eq!(err.code.0, -32010);
        assert_eq!(transport.calls(), 4);
    }
}
