//! Monitoring session loop
//!
//! One session owns one camera handle, one detector, and one actuator,
//! and runs the capture -> detect -> estimate -> transition -> render
//! pipeline sequentially per frame. The loop is blocking; callers that
//! need to stay responsive run it through [`spawn`], which parks it on a
//! dedicated blocking task and exposes a stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use camera_capture::{FrameSource, VideoFrame};
use detection::{Region, RegionDetector};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use alerting::Actuator;

use crate::estimator::{select_eye_pair, GazeEstimator};
use crate::overlay;
use crate::state::{AlertCommand, AlertStateMachine};
use crate::MonitorError;

/// Counters reported when a session ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Frames pulled from the source
    pub frames: u64,
    /// Frames that produced a deviation signal (two eyes found)
    pub frames_with_signal: u64,
    /// Alerts started (== maximal deviated runs observed)
    pub alerts_started: u64,
}

/// One open-to-close monitoring session
pub struct Session<S, D, A> {
    source: S,
    detector: D,
    actuator: A,
    estimator: GazeEstimator,
    machine: AlertStateMachine,
    display: Option<mpsc::Sender<VideoFrame>>,
    stats: SessionStats,
}

impl<S, D, A> Session<S, D, A>
where
    S: FrameSource,
    D: RegionDetector,
    A: Actuator,
{
    pub fn new(source: S, detector: D, actuator: A, deviation_threshold_px: f32) -> Self {
        Self {
            source,
            detector,
            actuator,
            estimator: GazeEstimator::new(deviation_threshold_px),
            machine: AlertStateMachine::new(),
            display: None,
            stats: SessionStats::default(),
        }
    }

    /// Attach a display surface. Annotated frames are pushed with
    /// `try_send`; a full or closed channel drops the frame and never
    /// stalls the loop.
    pub fn with_display(mut self, display: mpsc::Sender<VideoFrame>) -> Self {
        self.display = Some(display);
        self
    }

    /// Run until the stop flag is set or a capture/detection failure ends
    /// the session. On every exit path the camera handle is released and
    /// an active alert is stopped before returning.
    pub fn run(mut self, stop: Arc<AtomicBool>) -> Result<SessionStats, MonitorError> {
        info!("Session started");
        let outcome = self.pump(&stop);

        if let Some(AlertCommand::Stop) = self.machine.finish() {
            if let Err(e) = self.actuator.stop_alert() {
                warn!(error = %e, "Failed to stop alert during teardown");
            }
        }

        match outcome {
            Ok(()) => {
                info!(
                    frames = self.stats.frames,
                    frames_with_signal = self.stats.frames_with_signal,
                    alerts_started = self.stats.alerts_started,
                    "Session ended"
                );
                Ok(self.stats)
            }
            Err(e) => {
                warn!(error = %e, "Session ended on error");
                Err(e)
            }
        }
    }

    fn pump(&mut self, stop: &AtomicBool) -> Result<(), MonitorError> {
        while !stop.load(Ordering::Relaxed) {
            let frame = self.source.next_frame()?;
            self.stats.frames += 1;

            let gray = frame.to_grayscale();
            let faces = self.detector.detect_faces(&gray)?;

            let mut face: Option<Region> = None;
            let mut eyes: Vec<Region> = Vec::new();
            let mut signal: Option<bool> = None;

            // Single-driver assumption: only the first face is considered.
            if let Some(first) = faces.first().copied() {
                face = Some(first);
                if let Some(crop) = gray.crop(first.x, first.y, first.width, first.height) {
                    let candidates = self.detector.detect_eyes(&crop)?;
                    // Crop coordinates back into frame space.
                    eyes = candidates
                        .iter()
                        .map(|r| r.offset(first.x, first.y))
                        .collect();

                    if let Some((left, right)) = select_eye_pair(&eyes) {
                        signal = Some(self.estimator.deviation(&left, &right));
                        self.stats.frames_with_signal += 1;
                        eyes = vec![left, right];
                    }
                }
            }

            match self.machine.observe(signal) {
                Some(AlertCommand::Start) => {
                    info!(frame = frame.sequence, "Gaze deviated, starting alert");
                    self.stats.alerts_started += 1;
                    self.actuator.start_alert()?;
                }
                Some(AlertCommand::Stop) => {
                    info!(frame = frame.sequence, "Gaze centered, stopping alert");
                    self.actuator.stop_alert()?;
                }
                None => {}
            }

            self.publish(&frame, face.as_ref(), &eyes);
        }
        debug!("Stop requested");
        Ok(())
    }

    fn publish(&self, frame: &VideoFrame, face: Option<&Region>, eyes: &[Region]) {
        let Some(display) = &self.display else {
            return;
        };
        if let Some(annotated) = overlay::annotate(frame, face, eyes) {
            if display.try_send(annotated).is_err() {
                // Display lagging or gone; drop the frame.
                debug!("Display channel rejected frame");
            }
        }
    }
}

/// Handle to a session running on a blocking task
pub struct SessionHandle {
    stop: Arc<AtomicBool>,
    join: tokio::task::JoinHandle<Result<SessionStats, MonitorError>>,
}

impl SessionHandle {
    /// Request a cooperative stop; the loop checks the flag once per frame.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Shared stop flag, for wiring to external signals.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop.clone()
    }

    /// Wait for the session to finish and collect its stats.
    pub async fn finished(self) -> Result<SessionStats, MonitorError> {
        self.join
            .await
            .map_err(|e| MonitorError::Task(e.to_string()))?
    }
}

/// Run a session on a dedicated blocking task so the caller stays
/// responsive while the loop blocks on frame capture.
pub fn spawn<S, D, A>(session: Session<S, D, A>) -> SessionHandle
where
    S: FrameSource + Send + 'static,
    D: RegionDetector + Send + 'static,
    A: Actuator + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = stop.clone();
    let join = tokio::task::spawn_blocking(move || session.run(flag));
    SessionHandle { stop, join }
}
