//! AcquisitionLoop - Frame Polling and Throttled Analysis
//!
//! ## Responsibilities
//!
//! - Repeatedly fetch frames from the FrameSource and refresh the cache
//! - Run the detection engine on a throttled cadence and refresh the summary
//! - Fixed backoff on failure; never terminates short of shutdown
//!
//! The loop is a single sequential task: never more than one acquisition or
//! analysis in flight at a time, by construction. Acquisition cadence is
//! decoupled from analysis cadence because decoding a frame is cheap and
//! should happen as fast as the upstream allows, while inference is
//! rate-limited independently.

use crate::detect::Detector;
use crate::error::{Error, Result};
use crate::frame_cache::FrameCache;
use crate::frame_source::{DecodedFrame, FrameSource};
use crate::summary::{epoch_secs, Summary};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Fixed backoff applied after any failed acquisition. This is the only
/// retry policy: unconditional, fixed-interval, infinite.
pub const RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// AcquisitionLoop instance
pub struct AcquisitionLoop {
    frame_source: Arc<FrameSource>,
    cache: Arc<FrameCache>,
    detector: Arc<dyn Detector>,
    /// Analysis cadence in seconds
    analyze_every: f64,
    confidence_threshold: f32,
    retry_backoff: Duration,
    running: Arc<RwLock<bool>>,
}

impl AcquisitionLoop {
    /// Create a new AcquisitionLoop
    pub fn new(
        frame_source: Arc<FrameSource>,
        cache: Arc<FrameCache>,
        detector: Arc<dyn Detector>,
        analyze_every: f64,
        confidence_threshold: f32,
    ) -> Self {
        Self {
            frame_source,
            cache,
            detector,
            analyze_every,
            confidence_threshold,
            retry_backoff: RETRY_BACKOFF,
            running: Arc::new(RwLock::new(false)),
        }
    }

    /// Start the loop. Runs until `stop` or process exit.
    pub async fn start(&self) {
        {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Acquisition loop already running");
                return;
            }
            *running = true;
        }

        tracing::info!(
            analyze_every = self.analyze_every,
            confidence_threshold = self.confidence_threshold,
            "Starting acquisition loop"
        );

        let frame_source = self.frame_source.clone();
        let cache = self.cache.clone();
        let detector = self.detector.clone();
        let analyze_every = self.analyze_every;
        let confidence_threshold = self.confidence_threshold;
        let retry_backoff = self.retry_backoff;
        let running = self.running.clone();

        tokio::spawn(async move {
            loop {
                {
                    if !*running.read().await {
                        break;
                    }
                }

                match frame_source.fetch().await {
                    Ok(frame) => {
                        let frame = Arc::new(frame);
                        cache.update_frame(frame.clone()).await;

                        let last = cache.read_summary().await;
                        if epoch_secs() - last.timestamp > analyze_every {
                            match Self::analyze(detector.clone(), frame, confidence_threshold)
                                .await
                            {
                                Ok(summary) => {
                                    tracing::debug!(
                                        detections = summary.detections.len(),
                                        "Analysis cycle complete"
                                    );
                                    cache.update_summary(summary).await;
                                }
                                Err(e) => {
                                    tracing::warn!(error = %e, "Analysis cycle failed");
                                }
                            }
                        }
                        // Loop immediately; the upstream paces us.
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Frame acquisition failed, backing off");
                        tokio::time::sleep(retry_backoff).await;
                    }
                }
            }

            tracing::info!("Acquisition loop stopped");
        });
    }

    /// Stop the loop
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Stopping acquisition loop");
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// One analysis cycle. Inference is CPU bound, so it runs off the async
    /// worker threads.
    async fn analyze(
        detector: Arc<dyn Detector>,
        frame: Arc<DecodedFrame>,
        confidence_threshold: f32,
    ) -> Result<Summary> {
        let detections = tokio::task::spawn_blocking(move || detector.detect(&frame.image))
            .await
            .map_err(|e| Error::Internal(format!("detector task panicked: {}", e)))?;

        Ok(Summary::from_detections(detections, confidence_threshold))
    }
}
