//! camnode - AI Camera Node
//!
//! Main entry point: wires the acquisition pipeline to the HTTP surface.

use anyhow::Context;
use camnode::acquisition::AcquisitionLoop;
use camnode::detect::{SsdDetector, CLASSES};
use camnode::frame_cache::FrameCache;
use camnode::frame_source::FrameSource;
use camnode::state::{AppConfig, AppState};
use camnode::stream_mux::StreamMux;
use camnode::web_api;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "camnode=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting camnode v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = AppConfig::default();
    tracing::info!(
        camera_url = %config.camera_url,
        analyze_every = config.analyze_every,
        confidence_threshold = config.confidence_threshold,
        model_path = %config.model_path.display(),
        "Configuration loaded"
    );

    // The detection model is a hard startup dependency; abort with the
    // fetch hint when it is missing.
    let detector = Arc::new(
        SsdDetector::load(&config.model_path, &CLASSES)
            .context("detection model unavailable")?,
    );
    tracing::info!(model_path = %config.model_path.display(), "Detection model loaded");

    // Initialize components
    let frame_source = Arc::new(FrameSource::new(&config.camera_url));
    let cache = Arc::new(FrameCache::new());
    let stream_mux = Arc::new(StreamMux::new(&config.camera_url, frame_source.clone()));
    let acquisition = Arc::new(AcquisitionLoop::new(
        frame_source.clone(),
        cache.clone(),
        detector,
        config.analyze_every,
        config.confidence_threshold,
    ));

    let state = AppState {
        config: config.clone(),
        cache,
        frame_source,
        stream_mux,
        acquisition: acquisition.clone(),
    };

    // Start the background acquisition loop
    acquisition.start().await;
    tracing::info!("Acquisition loop started");

    let app = web_api::create_router(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
