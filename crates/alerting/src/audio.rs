//! Looped audio playback actuator
//!
//! The rodio output stream is not `Send`, so it lives on a dedicated
//! playback thread for the lifetime of the actuator. Commands cross a
//! channel; the sound resource is opened once at startup and a failure
//! there is surfaced to the caller before any session starts.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::thread::{self, JoinHandle};

use rodio::{Decoder, OutputStream, Sink, Source};
use tracing::{debug, info, warn};

use crate::{Actuator, AlertError};

enum Command {
    Start,
    Stop,
    Shutdown,
}

/// Audio actuator driving a looped alert sound
pub struct AudioActuator {
    commands: Sender<Command>,
    worker: Option<JoinHandle<()>>,
}

impl AudioActuator {
    /// Open the default output device and decode the alert sound.
    ///
    /// Blocks until the playback thread reports it is ready; any device or
    /// decode failure is returned here, before the first frame is processed.
    pub fn open(sound_path: impl Into<PathBuf>) -> Result<Self, AlertError> {
        let path = sound_path.into();
        let (commands, rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);

        let worker = thread::Builder::new()
            .name("alert-audio".to_string())
            .spawn(move || playback_thread(path, rx, ready_tx))
            .map_err(|e| AlertError::Device(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                commands,
                worker: Some(worker),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(AlertError::Device(
                    "playback thread exited during startup".to_string(),
                ))
            }
        }
    }

    fn send(&self, command: Command) -> Result<(), AlertError> {
        self.commands.send(command).map_err(|_| AlertError::Disconnected)
    }
}

impl Actuator for AudioActuator {
    fn start_alert(&mut self) -> Result<(), AlertError> {
        debug!("Starting alert playback");
        self.send(Command::Start)
    }

    fn stop_alert(&mut self) -> Result<(), AlertError> {
        debug!("Stopping alert playback");
        self.send(Command::Stop)
    }
}

impl Drop for AudioActuator {
    fn drop(&mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Playback thread panicked during shutdown");
            }
        }
    }
}

fn playback_thread(
    path: PathBuf,
    commands: Receiver<Command>,
    ready: SyncSender<Result<(), AlertError>>,
) {
    let setup = || -> Result<(OutputStream, Sink), AlertError> {
        let (stream, handle) =
            OutputStream::try_default().map_err(|e| AlertError::Device(e.to_string()))?;
        let sink = Sink::try_new(&handle).map_err(|e| AlertError::Device(e.to_string()))?;

        let file = File::open(&path)
            .map_err(|e| AlertError::Sound(format!("{}: {}", path.display(), e)))?;
        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| AlertError::Sound(format!("{}: {}", path.display(), e)))?;

        // Queued once, paused; start/stop toggle playback of the loop.
        sink.append(source.repeat_infinite());
        sink.pause();
        Ok((stream, sink))
    };

    let (stream, sink) = match setup() {
        Ok(pair) => pair,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    info!(sound = %path.display(), "Alert playback ready");
    let _ = ready.send(Ok(()));

    // Stream must outlive the sink or playback goes silent.
    let _stream = stream;

    while let Ok(command) = commands.recv() {
        match command {
            Command::Start => sink.play(),
            Command::Stop => sink.pause(),
            Command::Shutdown => break,
        }
    }
    sink.stop();
    debug!("Playback thread exiting");
}
