//! Gaze-Deviation Alert Monitor
//!
//! The core loop of the driver monitoring demo: sample a camera, detect a
//! face and its eyes, estimate whether the gaze has turned away from
//! center, and drive a continuous audible alert while the deviation
//! persists.
//!
//! Pipeline per frame (sequential, one session per camera):
//! frame -> face regions -> eye regions -> deviation signal -> state
//! machine -> actuator, with a best-effort overlay side path for display.

pub mod config;
pub mod estimator;
pub mod overlay;
pub mod session;
pub mod state;

pub use config::MonitorConfig;
pub use estimator::{select_eye_pair, EyeCenter, GazeEstimator};
pub use session::{Session, SessionHandle, SessionStats};
pub use state::{AlertCommand, AlertState, AlertStateMachine};

use alerting::AlertError;
use camera_capture::CameraError;
use detection::DetectorError;
use thiserror::Error;

/// Session-fatal error taxonomy.
///
/// A frame with fewer than two detected eyes is not an error; it simply
/// withholds a state transition for that frame.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Detection error: {0}")]
    Detector(#[from] DetectorError),

    #[error("Alerting error: {0}")]
    Alert(#[from] AlertError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session task failed: {0}")]
    Task(String),
}
