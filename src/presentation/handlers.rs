// HTTP request handlers
use crate::application::state::{DashboardView, HealthView};
use crate::domain::event_log::LogEntry;
use crate::domain::metrics::MetricsRecord;
use crate::domain::snapshot::StateCounts;
use crate::presentation::app_state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/window", get(get_window))
        .route("/api/states", get(get_states))
        .route("/api/health", get(get_health))
        .route("/api/logs", get(get_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Whole dashboard view in one response
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    Json(state.reader.view().await)
}

/// Window records, most recent last
pub async fn get_window(State(state): State<Arc<AppState>>) -> Json<Vec<MetricsRecord>> {
    Json(state.reader.snapshot_sequence().await)
}

pub async fn get_states(State(state): State<Arc<AppState>>) -> Json<StateCounts> {
    Json(state.reader.current_states().await)
}

pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthView> {
    Json(state.reader.health().await)
}

pub async fn get_logs(State(state): State<Arc<AppState>>) -> Json<Vec<LogEntry>> {
    Json(state.reader.logs().await)
}
