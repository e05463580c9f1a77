//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::state::AppState;
use crate::tools::{
    WaybackCompareParams, WaybackSnapshotsParams, WaybackTimelineParams,
    cache::{CachePurgeParams, purge_impl, stats_impl},
    compare::compare_impl,
    snapshots::snapshots_impl,
    timeline::timeline_impl,
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

/// The main MCP server handler for wayback-rewind.
#[derive(Clone)]
pub struct RewindServer {
    state: AppState,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl RewindServer {
    /// Create a new server handler over shared state.
    pub fn new(state: AppState) -> Self {
        Self { state, tool_router: Self::tool_router() }
    }

    /// List archived snapshots of a site.
    #[tool(
        description = "List archived web snapshots of a site from the Wayback Machine. Returns one capture per day (or month), newest first, with archive and preview URLs."
    )]
    async fn wayback_snapshots(&self, params: Parameters<WaybackSnapshotsParams>) -> Result<CallToolResult, McpError> {
        snapshots_impl(&self.state.snapshots, params.0).await
    }

    /// Compare two snapshots of a site.
    #[tool(
        description = "Compare two archived snapshots of a site. Returns a structured analysis (summary, key, design, content and business changes). Works without an API key using a demo analysis."
    )]
    async fn wayback_compare(&self, params: Parameters<WaybackCompareParams>) -> Result<CallToolResult, McpError> {
        compare_impl(&self.state.insights, params.0).await
    }

    /// Narrative insights about a site's whole capture history.
    #[tool(
        description = "Generate narrative insights about how a site evolved across its archive history. The snapshot count and date range are looked up when all three are omitted; a partial set is rejected."
    )]
    async fn wayback_timeline_insights(
        &self, params: Parameters<WaybackTimelineParams>,
    ) -> Result<CallToolResult, McpError> {
        timeline_impl(&self.state, params.0).await
    }

    /// Inspect the result cache.
    #[tool(
        description = "Show the number of result cache entries and their keys. Expired entries are included until they are read or purged."
    )]
    async fn cache_stats(&self) -> Result<CallToolResult, McpError> {
        stats_impl(&self.state.cache).await
    }

    /// Purge the result cache.
    #[tool(description = "Purge result cache entries by key, expired entries only, or everything.")]
    async fn cache_purge(&self, params: Parameters<CachePurgeParams>) -> Result<CallToolResult, McpError> {
        purge_impl(&self.state.cache, params.0).await
    }
}

impl ServerHandler for RewindServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "wayback-rewind".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::state;

    #[test]
    fn test_tools_registered() {
        let (state, _) = state(vec![]);
        let server = RewindServer::new(state);

        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();

        assert_eq!(
            names,
            vec!["cache_purge", "cache_stats", "wayback_compare", "wayback_snapshots", "wayback_timeline_insights"]
        );
    }

    #[test]
    fn test_cache_stats_description_mentions_expired_entries() {
        let (state, _) = state(vec![]);
        let server = RewindServer::new(state);

        let tool = server.tool_router.list_all().into_iter().find(|tool| tool.name == "cache_stats").unwrap();
        let description = tool.description.unwrap();
        assert!(!description.contains("live"));
        assert!(description.contains("Expired entries are included"));
    }

    #[test]
    fn test_server_info() {
        let (state, _) = state(vec![]);
        let info = RewindServer::new(state).get_info();
        assert_eq!(info.server_info.name, "wayback-rewind");
        assert!(info.capabilities.tools.is_some());
    }
}
