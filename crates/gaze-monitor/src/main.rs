//! Gaze Monitor - Main Entry Point

use alerting::AudioActuator;
use camera_capture::V4l2Camera;
use detection::OnnxRegionDetector;
use gaze_monitor::{session, MonitorConfig, Session};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

fn init_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    info!("=== Gaze Monitor v{} ===", env!("CARGO_PKG_VERSION"));

    let config = MonitorConfig::load()?;
    info!(
        device = %config.camera_config().device_path(),
        threshold_px = config.deviation_threshold_px,
        "Starting monitoring session"
    );

    // Fatal startup conditions: camera, classifier artifacts, audio device.
    let camera = V4l2Camera::open(config.camera_config())?;
    let detector = OnnxRegionDetector::new(&config.detector)?;
    let actuator = AudioActuator::open(config.alert_sound.as_str())?;

    let session = Session::new(camera, detector, actuator, config.deviation_threshold_px);
    let handle = session::spawn(session);

    let stop = handle.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, stopping session");
            stop.store(true, std::sync::atomic::Ordering::Relaxed);
        }
    });

    match handle.finished().await {
        Ok(stats) => {
            info!(
                frames = stats.frames,
                frames_with_signal = stats.frames_with_signal,
                alerts_started = stats.alerts_started,
                "Session complete"
            );
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Session failed");
            Err(e.into())
        }
    }
}
