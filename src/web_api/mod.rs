//! WebAPI - HTTP Endpoints
//!
//! ## Responsibilities
//!
//! - Query surface (`/shot.jpg`, `/summary.json`)
//! - Video streaming endpoint (`/video`)
//! - Dashboard page and health check

mod routes;

pub use routes::create_router;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::state::AppState;

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.cache.read_summary().await;
    let has_frame = state.cache.read_frame().await.is_some();

    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "acquisition_running": state.acquisition.is_running().await,
        "has_frame": has_frame,
        "summary_ts": summary.timestamp,
    }))
}
