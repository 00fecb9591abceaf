//! StreamMux - Dual-Mode Video Streaming
//!
//! ## Responsibilities
//!
//! - Relay mode: forward the upstream's native multipart stream verbatim
//! - Fallback mode: synthesize a multipart stream from freshly fetched
//!   stills when the relay cannot be established
//!
//! Each viewer gets an independent session. The relay/fallback decision is
//! made once per session: once a viewer drops to fallback it never returns
//! to relay, even if the upstream stream recovers. Fallback re-fetches the
//! upstream directly per viewer rather than reading the cache, so every
//! viewer sees the freshest possible frame.

use crate::error::Result;
use crate::frame_source::{FrameSource, JPEG_QUALITY};
use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Multipart boundary advertised in the `/video` content type
pub const BOUNDARY: &str = "frame";

/// Pacing between synthesized fallback frames
const FRAME_INTERVAL: Duration = Duration::from_millis(150);
/// Backoff after a failed fallback frame
const ERROR_BACKOFF: Duration = Duration::from_millis(500);
/// Relay connect timeout; the streamed body itself has no deadline
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Per-viewer chunk buffer
const VIEWER_BUFFER: usize = 8;

enum RelayOutcome {
    /// Upstream closed the stream cleanly
    Finished,
    /// Relay could not be established or died mid-stream
    Failed,
    /// Viewer went away
    ViewerGone,
}

/// StreamMux instance
pub struct StreamMux {
    relay_client: reqwest::Client,
    frame_source: Arc<FrameSource>,
    video_url: String,
}

impl StreamMux {
    /// Create a new StreamMux for the given upstream base URL
    pub fn new(camera_url: &str, frame_source: Arc<FrameSource>) -> Self {
        // Connect timeout only: a total request timeout would kill the
        // long-lived relay body.
        let relay_client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            relay_client,
            frame_source,
            video_url: format!("{}/video", camera_url),
        }
    }

    /// Open an independent viewer session.
    ///
    /// Returns the stream of body chunks for this viewer; dropping it
    /// promptly terminates the session task without affecting other viewers.
    pub fn open_viewer(self: &Arc<Self>) -> ReceiverStream<Bytes> {
        let (tx, rx) = mpsc::channel(VIEWER_BUFFER);
        let mux = self.clone();
        tokio::spawn(async move {
            mux.run_viewer(tx).await;
        });
        ReceiverStream::new(rx)
    }

    async fn run_viewer(&self, tx: mpsc::Sender<Bytes>) {
        match self.relay(&tx).await {
            RelayOutcome::Finished | RelayOutcome::ViewerGone => return,
            RelayOutcome::Failed => {
                tracing::debug!("Relay unavailable, switching viewer to fallback mode");
            }
        }
        self.fallback(&tx).await;
    }

    /// Forward the upstream's native multipart stream verbatim.
    async fn relay(&self, tx: &mpsc::Sender<Bytes>) -> RelayOutcome {
        let resp = match self.relay_client.get(&self.video_url).send().await {
            Ok(resp) if resp.status().is_success() => resp,
            Ok(resp) => {
                tracing::debug!(status = %resp.status(), "Upstream refused video relay");
                return RelayOutcome::Failed;
            }
            Err(e) => {
                tracing::debug!(error = %e, "Upstream video connect failed");
                return RelayOutcome::Failed;
            }
        };

        let mut upstream = resp.bytes_stream();
        while let Some(chunk) = upstream.next().await {
            match chunk {
                Ok(bytes) => {
                    if tx.send(bytes).await.is_err() {
                        return RelayOutcome::ViewerGone;
                    }
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Relay read failed mid-stream");
                    return RelayOutcome::Failed;
                }
            }
        }

        RelayOutcome::Finished
    }

    /// Synthesize multipart parts from freshly fetched stills. Never
    /// terminates on error, only on viewer disconnect.
    async fn fallback(&self, tx: &mpsc::Sender<Bytes>) {
        loop {
            match self.next_part().await {
                Ok(part) => {
                    if tx.send(part).await.is_err() {
                        return;
                    }
                    tokio::time::sleep(FRAME_INTERVAL).await;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "Fallback frame failed, backing off");
                    tokio::time::sleep(ERROR_BACKOFF).await;
                }
            }
        }
    }

    /// Fetch one fresh still and wrap it as a multipart part.
    async fn next_part(&self) -> Result<Bytes> {
        let frame = self.frame_source.fetch().await?;
        let jpeg = frame.to_jpeg(JPEG_QUALITY)?;

        let header = format!("--{}\r\nContent-Type: image/jpeg\r\n\r\n", BOUNDARY);
        let mut part = Vec::with_capacity(header.len() + jpeg.len() + 2);
        part.extend_from_slice(header.as_bytes());
        part.extend_from_slice(&jpeg);
        part.extend_from_slice(b"\r\n");

        Ok(Bytes::from(part))
    }
}
