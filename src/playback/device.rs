use super::decode::DecodedAudio;
use crate::error::PlaybackError;
use rodio::{OutputStream, Sink};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

const DRAIN_POLL: Duration = Duration::from_millis(20);

/// Stop handle shared between a player and the thread driving its sink
///
/// The output stream cannot leave the thread that opened it, so the sink is
/// handed over here once it exists. A stop that arrives first wins.
#[derive(Default)]
pub struct OutputControl {
    stopped: AtomicBool,
    sink: Mutex<Option<Arc<Sink>>>,
}

impl OutputControl {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn slot(&self) -> MutexGuard<'_, Option<Arc<Sink>>> {
        self.sink.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register the sink to stop. Refused once stopped.
    pub fn attach(&self, sink: Arc<Sink>) -> bool {
        let mut slot = self.slot();
        if self.stopped.load(Ordering::SeqCst) {
            return false;
        }
        *slot = Some(sink);
        true
    }

    /// Silence the sink and clear its queue. Idempotent.
    pub fn stop(&self) {
        let mut slot = self.slot();
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(sink) = slot.take() {
            sink.stop();
            debug!("Output sink stopped");
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

/// Play on the default output device, blocking until the sink drains or is stopped
pub fn play_blocking(audio: &DecodedAudio, control: &OutputControl) -> Result<(), PlaybackError> {
    let (_stream, handle) =
        OutputStream::try_default().map_err(|e| PlaybackError::Device(e.to_string()))?;
    let sink = Arc::new(Sink::try_new(&handle).map_err(|e| PlaybackError::Device(e.to_string()))?);

    if !control.attach(Arc::clone(&sink)) {
        debug!("Playback stopped before the sink opened");
        return Ok(());
    }

    sink.append(audio.source());
    info!(
        "Playing reply on output device ({:.1}s)",
        audio.duration().as_secs_f64()
    );

    while !sink.empty() && !control.is_stopped() {
        std::thread::sleep(DRAIN_POLL);
    }

    Ok(())
}
