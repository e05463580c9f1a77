//! MCP tool implementations.
//!
//! This module contains all tools exposed by the wayback-rewind server.

pub mod cache;
pub mod compare;
pub mod snapshots;
pub mod timeline;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use rewind_core::Error;
use serde::Serialize;

pub use compare::WaybackCompareParams;
pub use snapshots::WaybackSnapshotsParams;
pub use timeline::WaybackTimelineParams;

/// Render a tool output as pretty JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output)
        .map_err(|e| Error::InvalidInput(format!("Failed to serialize output: {e}")))?;

    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
pub(crate) fn output_json(result: &CallToolResult) -> serde_json::Value {
    let content = serde_json::to_value(&result.content[0]).unwrap();
    let text = content
        .get("text")
        .and_then(|v| v.as_str())
        .expect("Expected text field in content");
    serde_json::from_str(text).unwrap()
}
