//! JSON HTTP API.
//!
//! Routes:
//! - `GET /api/snapshots?url=&limit=&collapse=&order=`
//! - `POST /api/analyze`
//! - `POST /api/insights`
//! - `GET /health`

pub mod handlers;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the API router with tracing and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/snapshots", get(handlers::snapshots_handler))
        .route("/api/analyze", post(handlers::analyze_handler))
        .route("/api/insights", post(handlers::insights_handler))
        .route("/health", get(handlers::health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind `addr` and serve until ctrl-c.
pub async fn serve(state: AppState, addr: &str) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "failed to listen for shutdown signal");
            }
        })
        .await?;

    Ok(())
}
