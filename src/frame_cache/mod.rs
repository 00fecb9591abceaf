//! FrameCache - Shared Latest-Frame / Latest-Summary Cache
//!
//! ## Responsibilities
//!
//! - Hold the single most recent frame and the single most recent summary
//! - Atomic read/update semantics for concurrent consumers
//!
//! One writer (the acquisition loop) replaces values; arbitrarily many
//! readers take `Arc` snapshots, so a reader can never observe a partially
//! written frame or summary. The two fields update independently: a frame
//! newer than the summary is expected and benign. No operation performs I/O.

use crate::frame_source::DecodedFrame;
use crate::summary::Summary;
use std::sync::Arc;
use tokio::sync::RwLock;

struct CacheState {
    frame: Option<Arc<DecodedFrame>>,
    summary: Arc<Summary>,
}

/// FrameCache instance
pub struct FrameCache {
    inner: RwLock<CacheState>,
}

impl FrameCache {
    /// Create an empty cache: no frame, zero-timestamp summary
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CacheState {
                frame: None,
                summary: Arc::new(Summary::default()),
            }),
        }
    }

    /// Replace the cached frame
    pub async fn update_frame(&self, frame: Arc<DecodedFrame>) {
        self.inner.write().await.frame = Some(frame);
    }

    /// Replace the cached summary
    pub async fn update_summary(&self, summary: Summary) {
        self.inner.write().await.summary = Arc::new(summary);
    }

    /// Snapshot of the most recent frame, if any
    pub async fn read_frame(&self) -> Option<Arc<DecodedFrame>> {
        self.inner.read().await.frame.clone()
    }

    /// Snapshot of the most recent summary
    pub async fn read_summary(&self) -> Arc<Summary> {
        self.inner.read().await.summary.clone()
    }
}

impl Default for FrameCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{det, test_frame};
    use std::time::Duration;

    #[tokio::test]
    async fn starts_empty_with_zero_timestamp() {
        let cache = FrameCache::new();
        assert!(cache.read_frame().await.is_none());
        let summary = cache.read_summary().await;
        assert_eq!(summary.timestamp, 0.0);
        assert!(summary.counts.is_empty());
        assert!(summary.detections.is_empty());
    }

    #[tokio::test]
    async fn frame_updates_are_monotonic() {
        let cache = FrameCache::new();

        cache.update_frame(Arc::new(test_frame())).await;
        let first = cache.read_frame().await.expect("frame");

        cache.update_frame(Arc::new(test_frame())).await;
        let second = cache.read_frame().await.expect("frame");

        assert!(second.captured_at >= first.captured_at);
    }

    #[tokio::test]
    async fn frame_update_leaves_summary_untouched() {
        let cache = FrameCache::new();
        cache
            .update_summary(Summary::from_detections(vec![det("person", 0.9)], 0.5))
            .await;
        let ts = cache.read_summary().await.timestamp;

        cache.update_frame(Arc::new(test_frame())).await;
        assert_eq!(cache.read_summary().await.timestamp, ts);
    }

    #[tokio::test]
    async fn concurrent_readers_never_see_torn_summaries() {
        let cache = Arc::new(FrameCache::new());

        let writer = {
            let cache = cache.clone();
            tokio::spawn(async move {
                for i in 0..200u32 {
                    let detections = (0..(i % 4))
                        .map(|_| det("person", 0.9))
                        .chain((0..(i % 3)).map(|_| det("car", 0.8)))
                        .collect();
                    cache
                        .update_summary(Summary::from_detections(detections, 0.5))
                        .await;
                    tokio::task::yield_now().await;
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    for _ in 0..200 {
                        let summary = cache.read_summary().await;
                        let total: u32 = summary.counts.values().sum();
                        assert_eq!(total as usize, summary.detections.len());
                        assert!(summary.counts.values().all(|&c| c > 0));
                        tokio::time::sleep(Duration::from_micros(50)).await;
                    }
                })
            })
            .collect();

        writer.await.unwrap();
        for reader in readers {
            reader.await.unwrap();
        }
    }
}
