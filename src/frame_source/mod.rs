//! FrameSource - Still Image Acquisition from the Upstream Camera
//!
//! ## Responsibilities
//!
//! - One HTTP GET of `{CAMERA_URL}/shot.jpg` per call, bounded timeout
//! - In-memory decode of the response body
//! - Re-encoding decoded frames as JPEG for delivery
//!
//! Retry policy belongs to callers; this adapter never retries internally
//! and retains no state between calls.

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use image::RgbImage;
use std::time::Duration;

/// Timeout applied to each upstream fetch
const FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// JPEG quality used whenever a decoded frame is re-encoded for delivery
pub const JPEG_QUALITY: u8 = 80;

/// Decoded still frame plus its capture timestamp.
///
/// Immutable once produced; ownership transfers to whichever component
/// accepted it (cache or a transient caller).
#[derive(Debug, Clone)]
pub struct DecodedFrame {
    /// Raster pixel data
    pub image: RgbImage,
    /// When the fetch that produced this frame completed
    pub captured_at: DateTime<Utc>,
}

impl DecodedFrame {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Re-encode the frame as JPEG
    pub fn to_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
        encoder
            .encode_image(&self.image)
            .map_err(|e| Error::EncodeFailure(e.to_string()))?;
        Ok(buf)
    }
}

/// FrameSource instance
pub struct FrameSource {
    client: reqwest::Client,
    shot_url: String,
}

impl FrameSource {
    /// Create a new FrameSource for the given upstream base URL
    pub fn new(camera_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            shot_url: format!("{}/shot.jpg", camera_url),
        }
    }

    /// Fetch and decode one still frame.
    ///
    /// Side effect: exactly one outbound request. Fails with
    /// `UpstreamUnreachable` when the camera cannot be reached or answers
    /// with an error status, `DecodeFailure` when the body is not an image.
    pub async fn fetch(&self) -> Result<DecodedFrame> {
        let resp = self
            .client
            .get(&self.shot_url)
            .send()
            .await
            .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(Error::UpstreamUnreachable(format!(
                "camera returned {}",
                resp.status()
            )));
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::UpstreamUnreachable(e.to_string()))?;

        let image = image::load_from_memory(&body)
            .map_err(|e| Error::DecodeFailure(e.to_string()))?
            .to_rgb8();

        Ok(DecodedFrame {
            image,
            captured_at: Utc::now(),
        })
    }
}
