//! Alarm audio playback

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::mpsc::{self, RecvTimeoutError},
    thread,
    time::Duration,
};

use rodio::source::{SineWave, Source};
use rodio::{Decoder, OutputStream, Sink};
use tracing::debug;

/// Starts looping alarm playback
///
/// Failure to start is non-fatal; callers get `None` and carry on.
pub trait AlarmPlayer: Send + Sync {
    fn start(&self) -> Option<Box<dyn AlarmHandle>>;
}

/// Ownership of one live alarm playback; stopping is infallible
pub trait AlarmHandle: Send {
    fn stop(&mut self);
}

/// Alarm player backed by rodio
///
/// Playback runs on a dedicated thread because the audio output stream is
/// not `Send`. The thread re-appends one alarm cycle whenever the sink runs
/// dry, which is what makes the alarm loop, and polls for a stop request
/// between cycles.
pub struct RodioAlarmPlayer {
    sound: Option<PathBuf>,
}

impl RodioAlarmPlayer {
    /// Create a player that loops `sound` if given, or a synthesized
    /// two-tone beep otherwise
    pub fn new(sound: Option<PathBuf>) -> Self {
        Self { sound }
    }
}

impl AlarmPlayer for RodioAlarmPlayer {
    fn start(&self) -> Option<Box<dyn AlarmHandle>> {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let sound = self.sound.clone();

        let spawned = thread::Builder::new()
            .name("alarm-playback".to_string())
            .spawn(move || {
                let (_stream, handle) = match OutputStream::try_default() {
                    Ok(output) => output,
                    Err(e) => {
                        debug!("No audio output available: {}", e);
                        return;
                    }
                };
                let sink = match Sink::try_new(&handle) {
                    Ok(sink) => sink,
                    Err(e) => {
                        debug!("Failed to create audio sink: {}", e);
                        return;
                    }
                };

                loop {
                    if sink.empty() {
                        append_cycle(&sink, sound.as_deref());
                    }
                    match stop_rx.recv_timeout(Duration::from_millis(100)) {
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                        Err(RecvTimeoutError::Timeout) => {}
                    }
                }

                sink.stop();
            });

        match spawned {
            Ok(_) => Some(Box::new(RodioAlarmHandle {
                stop_tx: Some(stop_tx),
            })),
            Err(e) => {
                debug!("Failed to spawn alarm playback thread: {}", e);
                None
            }
        }
    }
}

/// Append one alarm cycle to the sink: the configured sound file, or a
/// two-tone beep followed by a rest
fn append_cycle(sink: &Sink, sound: Option<&Path>) {
    if let Some(path) = sound {
        let decoded = File::open(path)
            .map_err(|e| e.to_string())
            .and_then(|file| Decoder::new(BufReader::new(file)).map_err(|e| e.to_string()));
        match decoded {
            Ok(source) => {
                sink.append(source);
                return;
            }
            Err(e) => debug!("Falling back to synthesized alarm: {}", e),
        }
    }

    // 880 Hz (A5) and 1108 Hz (C#6), same voicing as a classic alarm chirp
    let tone1 = SineWave::new(880.0)
        .take_duration(Duration::from_millis(150))
        .amplify(0.3);
    let pause = SineWave::new(0.0)
        .take_duration(Duration::from_millis(50))
        .amplify(0.0);
    let tone2 = SineWave::new(1108.0)
        .take_duration(Duration::from_millis(200))
        .amplify(0.3);
    let rest = SineWave::new(0.0)
        .take_duration(Duration::from_millis(600))
        .amplify(0.0);

    sink.append(tone1);
    sink.append(pause);
    sink.append(tone2);
    sink.append(rest);
}

/// Handle that signals the playback thread to stop
pub struct RodioAlarmHandle {
    stop_tx: Option<mpsc::Sender<()>>,
}

impl AlarmHandle for RodioAlarmHandle {
    fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}

impl Drop for RodioAlarmHandle {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
