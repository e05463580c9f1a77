//! HTTP route handlers.

use std::str::FromStr;

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use chrono::Utc;
use rewind_client::{ComparisonRequest, TimelineRequest};
use rewind_core::{Collapse, SortOrder};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;
use crate::tools::compare::{CompareOutput, run_comparison};
use crate::tools::snapshots::{WaybackSnapshotsOutput, WaybackSnapshotsParams, list_snapshots};
use crate::tools::timeline::{TimelineOutput, run_timeline};

/// Raw query string of `GET /api/snapshots`.
///
/// Kept as strings so malformed values get the JSON error envelope instead of
/// the framework's plain-text rejection.
#[derive(Debug, Default, Deserialize)]
pub struct SnapshotsQuery {
    pub url: Option<String>,
    pub limit: Option<String>,
    pub collapse: Option<String>,
    pub order: Option<String>,
}

impl SnapshotsQuery {
    fn into_params(self) -> Result<WaybackSnapshotsParams, ApiError> {
        let url = self
            .url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ApiError::invalid("URL parameter is required"))?;

        let limit = parse_opt::<usize>(self.limit.as_deref(), "limit")?;
        let collapse = parse_opt::<Collapse>(self.collapse.as_deref(), "collapse")?;
        let order = parse_opt::<SortOrder>(self.order.as_deref(), "order")?;

        Ok(WaybackSnapshotsParams { url, limit, collapse, order, group_by_year: false })
    }
}

fn parse_opt<T: FromStr>(raw: Option<&str>, name: &str) -> Result<Option<T>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| ApiError::invalid(format!("invalid {name} parameter: {value}"))),
    }
}

/// `GET /api/snapshots`
pub async fn snapshots_handler(
    State(state): State<AppState>, query: Result<Query<SnapshotsQuery>, QueryRejection>,
) -> Result<Json<WaybackSnapshotsOutput>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::invalid(format!("Invalid query string: {}", e.body_text())))?;
    let params = query.into_params()?;
    let output = list_snapshots(&state.snapshots, params).await?;
    Ok(Json(output))
}

/// `POST /api/analyze`
pub async fn analyze_handler(
    State(state): State<AppState>, body: Result<Json<ComparisonRequest>, JsonRejection>,
) -> Result<Json<CompareOutput>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::invalid(format!("Missing required parameters: {}", e.body_text())))?;
    let output = run_comparison(&state.insights, &req).await?;
    Ok(Json(output))
}

/// `POST /api/insights`
pub async fn insights_handler(
    State(state): State<AppState>, body: Result<Json<TimelineRequest>, JsonRejection>,
) -> Result<Json<TimelineOutput>, ApiError> {
    let Json(req) = body.map_err(|e| ApiError::invalid(format!("Invalid request body: {}", e.body_text())))?;
    let output = run_timeline(&state.insights, &req).await?;
    Ok(Json(output))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: String,
    /// `live` when a generation credential is configured, otherwise `demo`.
    insights: &'static str,
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: Utc::now().to_rfc3339(),
        insights: if state.insights.is_live() { "live" } else { "demo" },
    })
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use rewind_client::testing::Reply;
    use rewind_core::AppConfig;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::http::build_router;
    use crate::state::test_support::{INDEX_BODY, state, state_with};

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    async fn post(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_snapshots_ok() {
        let (state, transport) = state(vec![Reply::ok(INDEX_BODY)]);

        let (status, body) = get(build_router(state), "/api/snapshots?url=https://www.example.com/&limit=2").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "example.com");
        assert_eq!(body["count"], 2);
        assert_eq!(body["cached"], false);
        assert_eq!(body["snapshots"].as_array().unwrap().len(), 2);
        assert_eq!(body["snapshots"][0]["timestamp"], "20200305142233");
        assert_eq!(transport.recorded()[0].request.query_value("limit"), Some("2"));
    }

    #[tokio::test]
    async fn test_snapshots_cached_on_repeat() {
        let (state, transport) = state(vec![Reply::ok(INDEX_BODY)]);
        let app = build_router(state);

        get(app.clone(), "/api/snapshots?url=example.com").await;
        let (_, body) = get(app, "/api/snapshots?url=example.com").await;

        assert_eq!(body["cached"], true);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_snapshots_missing_url() {
        let (state, _) = state(vec![]);
        let (status, body) = get(build_router(state), "/api/snapshots").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "URL parameter is required");
    }

    #[tokio::test]
    async fn test_snapshots_bad_collapse() {
        let (state, _) = state(vec![]);
        let (status, body) = get(build_router(state), "/api/snapshots?url=example.com&collapse=hourly").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("collapse"));
    }

    #[tokio::test]
    async fn test_snapshots_duplicate_param_uses_json_envelope() {
        let (state, transport) = state(vec![]);
        let (status, body) = get(build_router(state), "/api/snapshots?url=a.com&url=b.com").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid query string"));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_snapshots_limit_too_large() {
        let (state, _) = state(vec![]);
        let (status, _) = get(build_router(state), "/api/snapshots?url=example.com&limit=500").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_timeout_is_504() {
        let (state, _) = state(vec![Reply::Hang]);
        let (status, body) = get(build_router(state), "/api/snapshots?url=example.com").await;

        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            body["error"],
            "The Wayback Machine is responding slowly right now. Please try again in a moment."
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshots_rate_limited_is_429() {
        let (state, _) = state(vec![Reply::status(429)]);
        let (status, _) = get(build_router(state), "/api/snapshots?url=example.com").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_snapshots_upstream_failure_is_500_without_detail() {
        let (state, _) = state(vec![Reply::Status(503, "secret backend trace".into())]);
        let (status, body) = get(build_router(state), "/api/snapshots?url=example.com").await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn test_analyze_demo() {
        let (state, transport) = state(vec![]);
        let body = r#"{"url":"example.com","date1":"2020-03-05","date2":"2010-01-05","archiveUrl1":"a","archiveUrl2":"b"}"#;

        let (status, json) = post(build_router(state), "/api/analyze", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["cached"], false);
        assert_eq!(json["source"], "fallback");
        assert!(json["analysis"]["keyChanges"].as_array().unwrap().len() >= 3);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_analyze_live_then_cached() {
        let content = r#"{"summary":"Rebrand.","keyChanges":["Logo"]}"#;
        let completion = serde_json::json!({"choices": [{"message": {"content": content}}]}).to_string();
        let config = AppConfig { openai_api_key: Some("sk-test".into()), ..Default::default() };
        let (state, transport) = state_with(vec![Reply::ok(completion)], config);
        let app = build_router(state);

        let (_, first) = post(app.clone(), "/api/analyze", r#"{"url":"example.com","date1":"2010","date2":"2020"}"#).await;
        let (_, second) =
            post(app, "/api/analyze", r#"{"url":"example.com","date1":"2020","date2":"2010"}"#).await;

        assert_eq!(first["source"], "live");
        assert_eq!(first["analysis"]["summary"], "Rebrand.");
        assert_eq!(second["cached"], true);
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_analyze_missing_fields() {
        let (state, _) = state(vec![]);
        let (status, body) = post(build_router(state), "/api/analyze", r#"{"url":"example.com"}"#).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("date1"));
    }

    #[tokio::test]
    async fn test_analyze_malformed_json() {
        let (state, _) = state(vec![]);
        let (status, body) = post(build_router(state), "/api/analyze", "{not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_insights_demo() {
        let (state, _) = state(vec![]);
        let body = r#"{"url":"example.com","snapshotCount":30,"dateRange":{"oldest":"2004-01-01","newest":"2024-01-01"}}"#;

        let (status, json) = post(build_router(state), "/api/insights", body).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["source"], "fallback");
        assert!(json["insights"].as_str().unwrap().contains("spanning 20 years"));
    }

    #[tokio::test]
    async fn test_insights_missing_range() {
        let (state, _) = state(vec![]);
        let (status, _) = post(build_router(state), "/api/insights", r#"{"url":"example.com"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = state(vec![]);
        let (status, body) = get(build_router(state), "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["insights"], "demo");
    }
}
