//! Shared test helpers: throwaway upstream camera servers, JPEG fixtures,
//! and a scripted detector.

use crate::detect::{Detection, Detector};
use crate::frame_source::DecodedFrame;
use axum::Router;
use chrono::Utc;
use image::RgbImage;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpListener;

/// Encode a small solid-color JPEG usable as an upstream still.
pub fn test_jpeg() -> Vec<u8> {
    let mut img = RgbImage::new(8, 8);
    for px in img.pixels_mut() {
        px.0 = [40, 90, 200];
    }
    let mut buf = Vec::new();
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, 90);
    encoder.encode_image(&img).expect("encode test jpeg");
    buf
}

/// A decoded frame fixture with the current capture timestamp.
pub fn test_frame() -> DecodedFrame {
    DecodedFrame {
        image: image::load_from_memory(&test_jpeg())
            .expect("decode test jpeg")
            .to_rgb8(),
        captured_at: Utc::now(),
    }
}

/// Detection fixture with a fixed box.
pub fn det(label: &str, conf: f32) -> Detection {
    Detection {
        label: label.to_string(),
        conf,
        bbox: [0, 0, 10, 10],
    }
}

/// Serve a router on an ephemeral local port; returns the base URL.
pub async fn spawn_upstream(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
}

/// Base URL of a local port that refuses connections.
pub async fn dead_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

/// Detector returning a scripted detection set and counting invocations.
pub struct StubDetector {
    detections: Vec<Detection>,
    calls: AtomicUsize,
}

impl StubDetector {
    pub fn new(detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            detections,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Detector for StubDetector {
    fn detect(&self, _image: &RgbImage) -> Vec<Detection> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.detections.clone()
    }
}
