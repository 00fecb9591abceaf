//! camnode - AI Camera Node
//!
//! Pulls still frames from an upstream camera, runs them through an
//! object-detection model on a throttled cadence, and serves the latest
//! results plus a live MJPEG stream to any number of concurrent viewers.
//!
//! ## Architecture (6 Components)
//!
//! 1. FrameSource - still-image acquisition and decode
//! 2. Detector - pluggable object-detection engine (ONNX SSD backend)
//! 3. FrameCache - shared latest-frame / latest-summary cache
//! 4. AcquisitionLoop - background polling + throttled analysis
//! 5. StreamMux - dual-mode (relay/fallback) video streaming
//! 6. WebAPI - HTTP endpoints consumed by viewers and dashboards
//!
//! ## Design Principles
//!
//! - Single writer: only the AcquisitionLoop mutates the FrameCache
//! - Failures inside the loops back off and retry, never crash the process
//! - Each streaming viewer is an independent session

pub mod acquisition;
pub mod detect;
pub mod error;
pub mod frame_cache;
pub mod frame_source;
pub mod state;
pub mod stream_mux;
pub mod summary;
pub mod web_api;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{Error, Result};
pub use state::AppState;
