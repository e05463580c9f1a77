//! wayback-rewind server entry point.
//!
//! Boots either the MCP server on stdio transport or the JSON HTTP API,
//! depending on `REWIND_TRANSPORT`. Logging goes to stderr to avoid
//! interfering with the JSON-RPC protocol on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use rewind_client::ReqwestTransport;
use rewind_core::{AppConfig, TransportMode};
use rmcp::service::serve_server;
use rmcp::transport::io::stdio;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod http;
mod state;
mod tools;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let transport = Arc::new(ReqwestTransport::new(&config.user_agent)?);
    let mode = config.transport;
    let listen_addr = config.listen_addr.clone();

    if !config.has_generation_credential() {
        tracing::info!("no OPENAI_API_KEY configured, insights will use demo responses");
    }

    let state = state::AppState::new(config, transport)?;

    let sweeper = state
        .config
        .cache_sweep_interval()
        .map(|interval| state.cache.spawn_sweeper(interval));

    match mode {
        TransportMode::Stdio => {
            tracing::info!("Starting wayback-rewind server on stdio transport");

            let handler = handler::RewindServer::new(state);
            let server = serve_server(handler, stdio()).await?;
            server.waiting().await?;
        }
        TransportMode::Http => {
            tracing::info!(addr = %listen_addr, "Starting wayback-rewind HTTP API");
            http::serve(state, &listen_addr).await?;
        }
    }

    if let Some(handle) = sweeper {
        handle.abort();
    }

    Ok(())
}
