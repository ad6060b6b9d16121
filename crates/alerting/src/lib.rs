//! Alerting System
//!
//! The actuator behind the gaze monitor's state machine: a continuous
//! audio loop that runs between `start_alert` and `stop_alert`. The caller
//! is expected to issue the two commands in strict pairs (edge-triggered);
//! the actuator does not deduplicate on its own.

mod audio;

pub use audio::AudioActuator;

use thiserror::Error;

/// Alerting error types
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("Audio output unavailable: {0}")]
    Device(String),

    #[error("Alert sound unavailable: {0}")]
    Sound(String),

    #[error("Playback thread disconnected")]
    Disconnected,
}

/// Continuous alert actuator.
///
/// `start_alert` begins looped playback, `stop_alert` halts it. Calls are
/// not idempotent; double-starting is a caller bug.
pub trait Actuator {
    fn start_alert(&mut self) -> Result<(), AlertError>;
    fn stop_alert(&mut self) -> Result<(), AlertError>;
}
