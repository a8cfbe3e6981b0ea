//! Liveness endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Module name ("tbx-export")
    pub module: String,
    /// Crate version from Cargo.toml
    pub version: String,
    /// Seconds since service started
    pub uptime_seconds: u64,
    /// Configured catalog concurrency limit
    pub concurrency_limit: usize,
}

/// GET /
pub async fn home() -> Json<Value> {
    Json(json!({ "status": "API is Fine !" }))
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = Utc::now().signed_duration_since(state.startup_time);
    let uptime_seconds = uptime.num_seconds().max(0) as u64;

    Json(HealthResponse {
        status: "ok".to_string(),
        module: "tbx-export".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds,
        concurrency_limit: state.exporter.resolver().settings().concurrency_limit,
    })
}

/// Build liveness routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health_check))
}
