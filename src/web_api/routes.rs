//! API Routes

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;

use crate::frame_source::JPEG_QUALITY;
use crate::state::AppState;
use crate::stream_mux::BOUNDARY;
use crate::summary::render_english;

/// Create API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/healthz", get(super::health_check))
        .route("/shot.jpg", get(shot_jpg))
        .route("/summary.json", get(summary_json))
        .route("/video", get(video))
        .with_state(state)
}

const DASHBOARD_HTML: &str = r#"<!doctype html><html><head><meta charset="utf-8"/><meta name="viewport" content="width=device-width,initial-scale=1">
<title>AI Cam Node</title>
<style>
body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Helvetica,Arial,sans-serif;margin:24px}
.wrap{display:grid;gap:16px;grid-template-columns:1fr;max-width:980px}
.card{border:1px solid #ddd;border-radius:12px;padding:16px;box-shadow:0 2px 8px rgba(0,0,0,.05)}
img,video{max-width:100%;border-radius:8px}
.summary{font-size:1.1rem}.muted{color:#666;font-size:.9rem}code{background:#f5f5f5;padding:2px 6px;border-radius:6px}
</style></head><body><div class="wrap">
<div class="card"><h2>Live Feed</h2><img id="feed" src="/video" alt="Live video"/>
<div class="muted">If you see nothing, verify the camera is running &amp; CAMERA_URL in <code>.env</code>.</div></div>
<div class="card"><h2>AI Summary</h2><div id="summary" class="summary">Loading…</div>
<div class="muted">Updates every {{interval}}s • <code>/summary.json</code> • snapshot: <a href="/shot.jpg">/shot.jpg</a></div></div>
</div>
<script>
async function refresh(){try{const r=await fetch('/summary.json');const j=await r.json();document.getElementById('summary').textContent=j.english;}catch(e){document.getElementById('summary').textContent='No summary yet.'}}
setInterval(refresh, {{interval}}*1000);refresh();
</script></body></html>
"#;

/// Dashboard page
async fn dashboard(State(state): State<AppState>) -> Html<String> {
    let interval = format!("{}", state.config.analyze_every.max(1.0) as u64);
    Html(DASHBOARD_HTML.replace("{{interval}}", &interval))
}

/// Latest frame as JPEG.
///
/// Served from the cache; when the cache has never been populated a one-off
/// direct fetch is attempted. Degrades to 204 when nothing can be produced.
async fn shot_jpg(State(state): State<AppState>) -> Response {
    let frame = match state.cache.read_frame().await {
        Some(frame) => frame,
        None => match state.frame_source.fetch().await {
            Ok(frame) => Arc::new(frame),
            Err(e) => {
                tracing::debug!(error = %e, "No cached frame and direct fetch failed");
                return StatusCode::NO_CONTENT.into_response();
            }
        },
    };

    match frame.to_jpeg(JPEG_QUALITY) {
        Ok(jpeg) => (
            StatusCode::OK,
            [
                ("content-type", "image/jpeg"),
                ("cache-control", "no-cache, no-store, must-revalidate"),
            ],
            jpeg,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Snapshot encode failed");
            StatusCode::NO_CONTENT.into_response()
        }
    }
}

/// Latest summary plus its English rendering
async fn summary_json(State(state): State<AppState>) -> impl IntoResponse {
    let summary = state.cache.read_summary().await;
    Json(json!({
        "ts": summary.timestamp,
        "counts": &summary.counts,
        "detections": &summary.detections,
        "english": render_english(&summary),
    }))
}

/// Live video stream (relay or fallback, decided per viewer)
async fn video(State(state): State<AppState>) -> Response {
    let stream = state
        .stream_mux
        .open_viewer()
        .map(Ok::<_, std::convert::Infallible>);

    Response::builder()
        .status(StatusCode::OK)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/x-mixed-replace; boundary={}", BOUNDARY),
        )
        .header(header::CACHE_CONTROL, "no-cache, no-store, must-revalidate")
        .body(Body::from_stream(stream))
        .expect("Failed to build video response")
}
