//! Botel server library logic.

pub mod api;
pub mod api_widget;
pub mod config;

use axum::{
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post},
    Extension, Json, Router,
};
use botel_voice::VoiceService;
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Issues LiveKit rooms and join tokens.
    pub voice_service: Arc<VoiceService>,
}

impl AppState {
    pub fn new(config: &config::Config) -> Self {
        let voice_service = VoiceService::new(config.livekit.clone());
        if !voice_service.is_enabled() {
            tracing::warn!(
                "LiveKit credentials are not configured; /api/connection-details will return 503"
            );
        }
        Self {
            voice_service: Arc::new(voice_service),
        }
    }
}

/// Maximum request body size (64 KiB). No endpoint takes a meaningful body.
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// Health check handler.
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Builds the application router with all routes.
///
/// CORS is open: the widget is embedded on arbitrary host pages.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/connection-details",
            post(api::connection_details_handler),
        )
        .route(
            "/api/widget/config",
            get(api_widget::widget_config_handler),
        )
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers(Any),
        )
        .layer(Extension(Arc::new(state)))
}
