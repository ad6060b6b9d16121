//! Region Detection for the Gaze Monitor
//!
//! Consumed by the core as an external capability: given a grayscale frame,
//! return face rectangles; given a face crop, return eye candidate
//! rectangles. The ONNX backend loads two pre-trained classifier artifacts
//! (frontal face, eye) at startup; alternative backends plug in through the
//! [`RegionDetector`] trait.

pub mod onnx;
pub mod region;

pub use onnx::OnnxRegionDetector;
pub use region::Region;

use camera_capture::GrayFrame;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Detection error types
#[derive(Error, Debug)]
pub enum DetectorError {
    #[error("Model loading failed: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Image processing failed: {0}")]
    ImageProcessing(String),
}

/// Face and eye region detection capability.
///
/// Both calls are stateless per frame. `detect_faces` takes the full
/// grayscale frame; `detect_eyes` takes a frame already cropped to one face
/// region, and its output coordinates are relative to that crop.
pub trait RegionDetector {
    fn detect_faces(&self, frame: &GrayFrame) -> Result<Vec<Region>, DetectorError>;
    fn detect_eyes(&self, face: &GrayFrame) -> Result<Vec<Region>, DetectorError>;
}

/// Detector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Path to the frontal-face classifier artifact
    pub face_model_path: String,

    /// Path to the eye classifier artifact
    pub eye_model_path: String,

    /// Square input size of the face model
    pub face_input_size: u32,

    /// Square input size of the eye model
    pub eye_input_size: u32,

    /// Face detection confidence threshold
    pub face_confidence: f32,

    /// Eye detection confidence threshold
    pub eye_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            face_model_path: "models/face-frontal.onnx".to_string(),
            eye_model_path: "models/eye.onnx".to_string(),
            face_input_size: 128,
            eye_input_size: 64,
            face_confidence: 0.7,
            eye_confidence: 0.6,
        }
    }
}
