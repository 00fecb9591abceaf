//! Application state
//!
//! Holds configuration and the shared components

use crate::acquisition::AcquisitionLoop;
use crate::frame_cache::FrameCache;
use crate::frame_source::FrameSource;
use crate::stream_mux::StreamMux;
use std::path::PathBuf;
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Upstream camera base URL (trailing slash stripped)
    pub camera_url: String,
    /// Analysis cadence in seconds
    pub analyze_every: f64,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// ONNX detection model path
    pub model_path: PathBuf,
    /// Detection confidence floor (inclusive)
    pub confidence_threshold: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            camera_url: std::env::var("CAMERA_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8080".to_string())
                .trim_end_matches('/')
                .to_string(),
            analyze_every: std::env::var("ANALYZE_EVERY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(2.0),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5005),
            model_path: std::env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("models/mobilenet_ssd.onnx")),
            confidence_threshold: std::env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.5),
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// FrameCache (latest frame + summary)
    pub cache: Arc<FrameCache>,
    /// FrameSource (upstream still acquisition)
    pub frame_source: Arc<FrameSource>,
    /// StreamMux (per-viewer video sessions)
    pub stream_mux: Arc<StreamMux>,
    /// AcquisitionLoop (background polling)
    pub acquisition: Arc<AcquisitionLoop>,
}
