//! tbx-export library interface
//!
//! Exposes the export pipeline and router for integration testing

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::http::HeaderValue;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::services::PlaylistExporter;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Export pipeline (playlist source + bounded resolver)
    pub exporter: Arc<PlaylistExporter>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(exporter: PlaylistExporter) -> Self {
        Self {
            exporter: Arc::new(exporter),
            startup_time: tbx_common::time::now(),
        }
    }
}

/// CORS policy for the browser front-ends
///
/// Credentials are allowed, so methods and headers mirror the request
/// instead of using a wildcard. Unparseable origins are skipped.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// Build application router
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::export_routes())
        .with_state(state)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
