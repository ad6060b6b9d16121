//! ONNX classifier backend
//!
//! Loads the two pre-trained artifacts once at startup and runs per-frame
//! inference with tract. Both models are single-input, single-output
//! detectors: input is a normalized grayscale square, output is a flat list
//! of `[cx, cy, w, h, score]` rows in normalized coordinates.

use camera_capture::GrayFrame;
use tract_onnx::prelude::*;
use tracing::{debug, info};

use crate::{DetectorConfig, DetectorError, Region, RegionDetector};

type RunnableOnnx = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// One loaded classifier stage (face or eye)
struct Stage {
    model: RunnableOnnx,
    input_size: u32,
    confidence: f32,
}

impl Stage {
    fn load(path: &str, input_size: u32, confidence: f32) -> Result<Self, DetectorError> {
        info!(path, input_size, "Loading classifier artifact");
        let size = input_size as usize;
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .map_err(|e| DetectorError::ModelLoad(format!("{}: {}", path, e)))?
            .with_input_fact(0, f32::fact([1, 1, size, size]).into())
            .map_err(|e| DetectorError::ModelLoad(e.to_string()))?
            .into_optimized()
            .map_err(|e| DetectorError::ModelLoad(e.to_string()))?
            .into_runnable()
            .map_err(|e| DetectorError::ModelLoad(e.to_string()))?;

        Ok(Self {
            model,
            input_size,
            confidence,
        })
    }

    /// Run the stage over one grayscale frame, mapping detections back to
    /// frame pixel coordinates.
    fn detect(&self, frame: &GrayFrame) -> Result<Vec<Region>, DetectorError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(DetectorError::ImageProcessing("empty frame".to_string()));
        }

        let size = self.input_size as usize;
        let scale_x = frame.width as f32 / self.input_size as f32;
        let scale_y = frame.height as f32 / self.input_size as f32;

        // Nearest-neighbor resample into a normalized 1x1xSxS tensor
        let input = tract_ndarray::Array4::from_shape_fn((1, 1, size, size), |(_, _, y, x)| {
            let src_x = ((x as f32 * scale_x) as u32).min(frame.width - 1);
            let src_y = ((y as f32 * scale_y) as u32).min(frame.height - 1);
            frame.get(src_x, src_y).unwrap_or(0) as f32 / 255.0
        });

        let result = self
            .model
            .run(tvec!(Tensor::from(input).into()))
            .map_err(|e| DetectorError::Inference(e.to_string()))?;
        let output = result[0]
            .to_array_view::<f32>()
            .map_err(|e| DetectorError::Inference(e.to_string()))?;

        let values: Vec<f32> = output.iter().copied().collect();
        let mut regions = Vec::new();
        for row in values.chunks_exact(5) {
            let (cx, cy, w, h, score) = (row[0], row[1], row[2], row[3], row[4]);
            if score < self.confidence {
                continue;
            }

            let px_w = (w * frame.width as f32).max(1.0);
            let px_h = (h * frame.height as f32).max(1.0);
            let px_x = (cx * frame.width as f32 - px_w / 2.0).max(0.0);
            let px_y = (cy * frame.height as f32 - px_h / 2.0).max(0.0);

            let x = px_x as u32;
            let y = px_y as u32;
            if x >= frame.width || y >= frame.height {
                continue;
            }
            regions.push(Region::new(
                x,
                y,
                (px_w as u32).min(frame.width - x),
                (px_h as u32).min(frame.height - y),
            ));
        }

        debug!(candidates = regions.len(), "Stage detection complete");
        Ok(regions)
    }
}

/// Detector backed by two ONNX classifier artifacts
pub struct OnnxRegionDetector {
    face: Stage,
    eyes: Stage,
}

impl OnnxRegionDetector {
    /// Load both artifacts. Any load failure is fatal for the session.
    pub fn new(config: &DetectorConfig) -> Result<Self, DetectorError> {
        Ok(Self {
            face: Stage::load(
                &config.face_model_path,
                config.face_input_size,
                config.face_confidence,
            )?,
            eyes: Stage::load(
                &config.eye_model_path,
                config.eye_input_size,
                config.eye_confidence,
            )?,
        })
    }
}

impl RegionDetector for OnnxRegionDetector {
    fn detect_faces(&self, frame: &GrayFrame) -> Result<Vec<Region>, DetectorError> {
        self.face.detect(frame)
    }

    fn detect_eyes(&self, face: &GrayFrame) -> Result<Vec<Region>, DetectorError> {
        self.eyes.detect(face)
    }
}
