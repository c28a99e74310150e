use crate::backend::Reply;
use crate::error::{BackendError, CaptureErrorKind, PlaybackError};
use tokio::sync::mpsc;
use tracing::debug;

/// Identifies one utterance → reply cycle
pub type TurnId = u64;

/// Identifies one capture start; bumped every time capture is armed
pub type CaptureEpoch = u64;

/// What a speech capture source reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// A finalized utterance
    Transcript(String),
    /// Recognition failed
    Error(CaptureErrorKind),
    /// Input stream closed
    SpeechEnd,
}

/// How a reply's playback resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Ended,
    Failed(PlaybackError),
}

/// Everything the turn controller reacts to, delivered one at a time
#[derive(Debug)]
pub enum TurnEvent {
    /// "Begin turn" gesture
    BeginRequested,
    /// "Stop" gesture
    StopRequested,
    /// Stop and leave the event loop
    Shutdown,
    Capture {
        epoch: CaptureEpoch,
        event: CaptureEvent,
    },
    Reply {
        turn: TurnId,
        result: Result<Reply, BackendError>,
    },
    Playback {
        turn: TurnId,
        outcome: PlaybackOutcome,
    },
}

/// Cloneable handle for posting events into a controller's inbox
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<TurnEvent>,
}

impl EventSender {
    /// Post an event. Returns false once the controller is gone.
    pub fn send(&self, event: TurnEvent) -> bool {
        match self.tx.send(event) {
            Ok(()) => true,
            Err(e) => {
                debug!("Turn controller gone, dropping {:?}", e.0);
                false
            }
        }
    }

    pub fn begin_turn(&self) -> bool {
        self.send(TurnEvent::BeginRequested)
    }

    pub fn stop(&self) -> bool {
        self.send(TurnEvent::StopRequested)
    }

    pub fn shutdown(&self) -> bool {
        self.send(TurnEvent::Shutdown)
    }
}

/// Receiving end of the controller inbox
#[derive(Debug)]
pub struct EventInbox {
    rx: mpsc::UnboundedReceiver<TurnEvent>,
}

impl EventInbox {
    pub async fn recv(&mut self) -> Option<TurnEvent> {
        self.rx.recv().await
    }

    /// Next event if one is already queued
    pub fn try_recv(&mut self) -> Option<TurnEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create a controller inbox and its sender
pub fn channel() -> (EventSender, EventInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, EventInbox { rx })
}
