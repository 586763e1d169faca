// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use tracing_subscriber::EnvFilter;

use crate::application::coordinator::DashboardCoordinator;
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::status_client::HttpStatusClient;
use crate::infrastructure::websocket_channel::WebSocketChannel;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Load configuration
    let config = load_dashboard_config()?;
    let settings = config.coordinator_settings();

    // Create channel adapters (infrastructure layer)
    let push = Arc::new(WebSocketChannel::new(config.push_url.clone()));
    let status = Arc::new(HttpStatusClient::new(
        config.status_url.clone(),
        settings.request_timeout,
    )?);

    // Start the coordinator (application layer)
    let handle = DashboardCoordinator::new(push, status, settings).start();
    tracing::info!(
        push = %config.push_url,
        status = %config.status_url,
        "Coordinator started"
    );

    // Build router (presentation layer)
    let state = Arc::new(AppState {
        reader: handle.reader(),
    });
    let app = router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen_addr {}", config.listen_addr))?;
    tracing::info!("Serving dashboard views on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
        })
        .await?;

    handle.shutdown().await;
    Ok(())
}
