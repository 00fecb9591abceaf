//! Detection engine seam
//!
//! The engine is a pluggable collaborator: given a decoded frame it returns
//! labeled, confidence-scored boxes in frame pixel coordinates. Backends
//! must not fail for well-formed input; internal inference errors degrade
//! to an empty detection set. Confidence filtering is the caller's job.

mod ssd;

pub use ssd::SsdDetector;

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// One detected object.
///
/// `box` is `[x1, y1, x2, y2]` in frame pixels with `x1 <= x2`, `y1 <= y2`,
/// clamped to the frame rectangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub label: String,
    pub conf: f32,
    #[serde(rename = "box")]
    pub bbox: [i32; 4],
}

/// Detection engine contract.
///
/// Deterministic given identical input, bounded latency, never fails for a
/// well-formed frame.
pub trait Detector: Send + Sync {
    fn detect(&self, image: &RgbImage) -> Vec<Detection>;
}

/// MobileNet-SSD label vocabulary, index-aligned with model class ids.
pub const CLASSES: [&str; 21] = [
    "background",
    "aeroplane",
    "bicycle",
    "bird",
    "boat",
    "bottle",
    "bus",
    "car",
    "cat",
    "chair",
    "cow",
    "diningtable",
    "dog",
    "horse",
    "motorbike",
    "person",
    "pottedplant",
    "sheep",
    "sofa",
    "train",
    "tvmonitor",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detection_serializes_box_field() {
        let det = Detection {
            label: "person".to_string(),
            conf: 0.91,
            bbox: [10, 20, 30, 40],
        };
        let json = serde_json::to_value(&det).unwrap();
        assert_eq!(json["label"], "person");
        assert_eq!(json["box"][0], 10);
        assert_eq!(json["box"][3], 40);
    }
}
