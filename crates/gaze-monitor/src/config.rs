//! Monitor configuration

use camera_capture::CameraConfig;
use detection::DetectorConfig;
use serde::{Deserialize, Serialize};

use crate::MonitorError;

/// Top-level configuration for one monitoring session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Video device index (`/dev/video{N}`)
    pub device_index: u32,

    /// Capture width
    pub frame_width: u32,

    /// Capture height
    pub frame_height: u32,

    /// Target FPS
    pub fps: u32,

    /// Horizontal eye-center deviation threshold, in frame pixels
    pub deviation_threshold_px: f32,

    /// Looped alert sound resource
    pub alert_sound: String,

    /// Detector backend settings
    pub detector: DetectorConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            frame_width: 640,
            frame_height: 480,
            fps: 30,
            deviation_threshold_px: 20.0,
            alert_sound: "assets/alert-loop.wav".to_string(),
            detector: DetectorConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Load from `gaze-monitor.toml` (if present) layered with `GAZE_*`
    /// environment variables; defaults fill everything else.
    pub fn load() -> Result<Self, MonitorError> {
        config::Config::builder()
            .add_source(config::File::with_name("gaze-monitor").required(false))
            .add_source(config::Environment::with_prefix("GAZE").separator("__"))
            .build()
            .map_err(|e| MonitorError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| MonitorError::Config(e.to_string()))
    }

    /// Camera settings for this configuration
    pub fn camera_config(&self) -> CameraConfig {
        CameraConfig {
            device_index: self.device_index,
            width: self.frame_width,
            height: self.frame_height,
            fps: self.fps,
        }
    }
}
