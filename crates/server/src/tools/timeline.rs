//! wayback_timeline_insights tool implementation.
//!
//! Freeform narrative about a site's capture history. When the caller does
//! not supply the history summary, it is derived from a snapshot listing.
//! A partial summary is rejected.

use rewind_client::insight::InsightSource;
use rewind_client::{InsightGateway, TimelineRequest};
use rewind_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Input parameters for the wayback_timeline_insights tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WaybackTimelineParams {
    /// Site URL (required).
    pub url: String,

    /// Number of archived snapshots. Supply with `oldest` and `newest`, or omit all three.
    #[serde(default)]
    pub snapshot_count: Option<usize>,

    /// Oldest capture date. Supply with `snapshot_count` and `newest`, or omit all three.
    #[serde(default)]
    pub oldest: Option<String>,

    /// Newest capture date. Supply with `snapshot_count` and `oldest`, or omit all three.
    #[serde(default)]
    pub newest: Option<String>,
}

/// Timeline insight text with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineOutput {
    pub insights: String,
    pub cached: bool,
    pub source: InsightSource,
}

/// Run a timeline request through the gateway.
pub async fn run_timeline(gateway: &InsightGateway, req: &TimelineRequest) -> Result<TimelineOutput, Error> {
    let outcome = gateway.timeline(req).await?;
    Ok(TimelineOutput { cached: outcome.cached(), insights: outcome.value, source: outcome.source })
}

async fn resolve_request(state: &AppState, params: WaybackTimelineParams) -> Result<TimelineRequest, Error> {
    match (params.snapshot_count, params.oldest.as_deref(), params.newest.as_deref()) {
        (Some(count), Some(oldest), Some(newest)) => {
            return Ok(TimelineRequest::new(params.url.as_str(), count, oldest, newest));
        }
        (None, None, None) => {}
        _ => {
            return Err(Error::InvalidInput(
                "snapshot_count, oldest and newest must be supplied together or not at all".to_string(),
            ));
        }
    }

    let listing = state
        .snapshots
        .list(&params.url, Some(state.config.max_snapshot_limit), None, Default::default())
        .await?;

    TimelineRequest::from_snapshots(listing.batch.url.as_str(), &listing.batch.snapshots)
        .ok_or_else(|| Error::InvalidInput(format!("no archived snapshots found for {}", listing.batch.url)))
}

/// Implementation of the wayback_timeline_insights tool.
pub async fn timeline_impl(state: &AppState, params: WaybackTimelineParams) -> Result<CallToolResult, McpError> {
    let req = resolve_request(state, params).await?;
    let output = run_timeline(&state.insights, &req).await?;
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{INDEX_BODY, state};
    use crate::tools::output_json;
    use rewind_client::testing::Reply;

    #[tokio::test]
    async fn test_explicit_history_skips_index() {
        let (state, transport) = state(vec![]);
        let params = WaybackTimelineParams {
            url: "example.com".into(),
            snapshot_count: Some(8),
            oldest: Some("2004-01-01".into()),
            newest: Some("2024-01-01".into()),
        };

        let output = output_json(&timeline_impl(&state, params).await.unwrap());

        assert_eq!(output["source"], "fallback");
        assert!(output["insights"].as_str().unwrap().contains("Based on 8 snapshots spanning 20 years"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_history_derived_from_listing() {
        let (state, transport) = state(vec![Reply::ok(INDEX_BODY)]);
        let params = WaybackTimelineParams { url: "https://example.com".into(), ..Default::default() };

        let output = output_json(&timeline_impl(&state, params).await.unwrap());

        assert!(output["insights"].as_str().unwrap().contains("Based on 3 snapshots spanning 10 years"));
        assert_eq!(transport.calls(), 1);
        assert_eq!(transport.recorded()[0].request.query_value("limit"), Some("100"));
    }

    #[tokio::test]
    async fn test_partial_history_rejected() {
        let (state, transport) = state(vec![Reply::ok(INDEX_BODY)]);
        let params = WaybackTimelineParams {
            url: "example.com".into(),
            snapshot_count: Some(8),
            oldest: Some("2004-01-01".into()),
            newest: None,
        };

        let err = timeline_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("supplied together"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_no_snapshots() {
        let (state, _) = state(vec![Reply::ok("[]")]);
        let params = WaybackTimelineParams { url: "nothing.example".into(), ..Default::default() };

        let err = timeline_impl(&state, params).await.unwrap_err();
        assert_eq!(err.code.0, -32602);
        assert!(err.message.contains("nothing.example"));
    }
}
