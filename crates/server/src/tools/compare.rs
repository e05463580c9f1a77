//! wayback_compare tool implementation.
//!
//! Asks the insight gateway for a structured comparison of two snapshots.

use rewind_client::insight::InsightSource;
use rewind_client::{ComparisonAnalysis, ComparisonRequest, InsightGateway};
use rewind_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;

/// Input parameters for the wayback_compare tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WaybackCompareParams {
    /// Site URL (required).
    pub url: String,

    /// First capture date (required). Accepts 14-digit timestamps, YYYY-MM-DD, or "Mar 5, 2020".
    pub date1: String,

    /// Second capture date (required). Order relative to date1 does not matter.
    pub date2: String,

    /// Archive URL of the first capture.
    #[serde(default)]
    pub archive_url1: Option<String>,

    /// Archive URL of the second capture.
    #[serde(default)]
    pub archive_url2: Option<String>,
}

impl From<WaybackCompareParams> for ComparisonRequest {
    fn from(params: WaybackCompareParams) -> Self {
        Self {
            url: params.url,
            date1: params.date1,
            date2: params.date2,
            archive_url1: params.archive_url1,
            archive_url2: params.archive_url2,
        }
    }
}

/// Comparison result with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareOutput {
    pub analysis: ComparisonAnalysis,
    pub cached: bool,
    pub source: InsightSource,
}

/// Run a comparison through the gateway.
pub async fn run_comparison(gateway: &InsightGateway, req: &ComparisonRequest) -> Result<CompareOutput, Error> {
    let outcome = gateway.compare(req).await?;
    Ok(CompareOutput { cached: outcome.cached(), analysis: outcome.value, source: outcome.source })
}

/// Implementation of the wayback_compare tool.
pub async fn compare_impl(gateway: &InsightGateway, params: WaybackCompareParams) -> Result<CallToolResult, McpError> {
    let output = run_comparison(gateway, &params.into()).await?;
    json_result(&output)
}
