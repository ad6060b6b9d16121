//! Camera Capture Library for the Gaze Monitor
//!
//! Provides V4L2 camera capture over the kernel read() interface.
//! Supports:
//! - Cabin-facing webcam (640x480 @ 30fps, YUYV)
//! - Grayscale conversion and region cropping for detection

pub mod frame;
pub mod v4l2;

pub use frame::{GrayFrame, VideoFrame};
pub use v4l2::V4l2Camera;

use thiserror::Error;

/// Camera error types
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Camera device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("Frame capture failed: {0}")]
    Capture(String),

    #[error("Invalid format: {0}")]
    Format(String),
}

/// A source of video frames.
///
/// One implementation wraps a live V4L2 device; tests substitute scripted
/// sources. A source produces a lazy, in principle unbounded sequence of
/// frames and is not restartable after a capture failure — reopen instead.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<VideoFrame, CameraError>;
}

/// Camera configuration
#[derive(Debug, Clone)]
pub struct CameraConfig {
    /// Video device index (`/dev/video{N}`)
    pub device_index: u32,
    /// Capture width
    pub width: u32,
    /// Capture height
    pub height: u32,
    /// Target FPS
    pub fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            width: 640,
            height: 480,
            fps: 30,
        }
    }
}

impl CameraConfig {
    /// Device path for this configuration
    pub fn device_path(&self) -> String {
        format!("/dev/video{}", self.device_index)
    }
}
