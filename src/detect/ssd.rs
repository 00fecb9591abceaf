//! ONNX SSD backend
//!
//! Loads a MobileNet-SSD style ONNX model and runs it on decoded frames.
//! Output rows are `(image_id, class, confidence, x1, y1, x2, y2)` with
//! normalized coordinates that get scaled to frame pixels.

use std::path::Path;

use image::imageops::FilterType;
use image::RgbImage;
use tract_onnx::prelude::*;

use crate::detect::{Detection, Detector};
use crate::error::{Error, Result};

/// Model input edge length
const INPUT_SIZE: u32 = 300;
/// Caffe-style preprocessing: (pixel - mean) * scale
const PIXEL_SCALE: f32 = 0.007843;
const PIXEL_MEAN: f32 = 127.5;

type SsdModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// SSD detector backed by tract-onnx
pub struct SsdDetector {
    model: SsdModel,
    labels: Vec<String>,
}

impl SsdDetector {
    /// Load the ONNX model from disk and prepare it for inference.
    ///
    /// A missing or unreadable model is a startup-time failure; the message
    /// tells the operator how to fetch the required assets.
    pub fn load<P: AsRef<Path>>(model_path: P, labels: &[&str]) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(Error::ModelUnavailable(format!(
                "missing model file {}; run scripts/fetch_model.sh",
                model_path.display()
            )));
        }

        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .map_err(|e| {
                Error::ModelUnavailable(format!(
                    "failed to load {}: {}",
                    model_path.display(),
                    e
                ))
            })?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(
                    f32::datum_type(),
                    tvec!(1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize),
                ),
            )
            .map_err(|e| Error::ModelUnavailable(format!("failed to set input fact: {}", e)))?
            .into_optimized()
            .map_err(|e| Error::ModelUnavailable(format!("failed to optimize model: {}", e)))?
            .into_runnable()
            .map_err(|e| Error::ModelUnavailable(format!("failed to build runnable model: {}", e)))?;

        Ok(Self {
            model,
            labels: labels.iter().map(|s| s.to_string()).collect(),
        })
    }

    fn run(&self, image: &RgbImage) -> TractResult<Vec<Detection>> {
        let frame_w = image.width() as f32;
        let frame_h = image.height() as f32;

        let resized = image::imageops::resize(image, INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
        let input = tract_ndarray::Array4::from_shape_fn(
            (1, 3, INPUT_SIZE as usize, INPUT_SIZE as usize),
            |(_, channel, y, x)| {
                let px = resized.get_pixel(x as u32, y as u32)[channel];
                (px as f32 - PIXEL_MEAN) * PIXEL_SCALE
            },
        )
        .into_tensor();

        let outputs = self.model.run(tvec!(input.into()))?;
        let scores = outputs[0].to_array_view::<f32>()?;
        let flat: Vec<f32> = scores.iter().cloned().collect();

        let mut detections = Vec::new();
        for row in flat.chunks_exact(7) {
            let conf = row[2];
            if !conf.is_finite() || conf <= 0.0 {
                continue;
            }
            let class_id = row[1] as usize;
            let label = self
                .labels
                .get(class_id)
                .cloned()
                .unwrap_or_else(|| format!("id{}", class_id));

            detections.push(Detection {
                label,
                conf: (conf * 100.0).round() / 100.0,
                bbox: to_pixel_box(&row[3..7], frame_w, frame_h),
            });
        }

        Ok(detections)
    }
}

impl Detector for SsdDetector {
    fn detect(&self, image: &RgbImage) -> Vec<Detection> {
        match self.run(image) {
            Ok(detections) => detections,
            Err(e) => {
                tracing::warn!(error = %e, "Inference failed, returning empty detection set");
                Vec::new()
            }
        }
    }
}

/// Scale a normalized `[x1, y1, x2, y2]` box to frame pixels, clamped to the
/// frame rectangle and with corners ordered.
fn to_pixel_box(coords: &[f32], frame_w: f32, frame_h: f32) -> [i32; 4] {
    let ax = (coords[0] * frame_w).clamp(0.0, frame_w);
    let ay = (coords[1] * frame_h).clamp(0.0, frame_h);
    let bx = (coords[2] * frame_w).clamp(0.0, frame_w);
    let by = (coords[3] * frame_h).clamp(0.0, frame_h);

    [
        ax.min(bx).round() as i32,
        ay.min(by).round() as i32,
        ax.max(bx).round() as i32,
        ay.max(by).round() as i32,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_box_scales_and_orders_corners() {
        let bbox = to_pixel_box(&[0.25, 0.5, 0.75, 0.25], 640.0, 480.0);
        assert_eq!(bbox, [160, 120, 480, 240]);
    }

    #[test]
    fn pixel_box_clamps_to_frame() {
        let bbox = to_pixel_box(&[-0.2, -0.1, 1.4, 1.1], 640.0, 480.0);
        assert_eq!(bbox, [0, 0, 640, 480]);
    }

    #[test]
    fn missing_model_is_fatal_with_fetch_hint() {
        let err = SsdDetector::load("does/not/exist.onnx", &crate::detect::CLASSES)
            .err()
            .expect("load should fail");
        match err {
            Error::ModelUnavailable(msg) => assert!(msg.contains("fetch_model.sh")),
            other => panic!("expected ModelUnavailable, got {:?}", other),
        }
    }
}
