use super::config::ControllerConfig;
use super::events::{self, CaptureEvent, EventInbox, EventSender, PlaybackOutcome, TurnEvent, TurnId};
use super::state::{Session, SessionSnapshot, Turn, TurnState};
use crate::backend::{DialogueBackend, Reply};
use crate::capture::{CaptureEvents, SpeechCapture};
use crate::chat::{ChatSink, Speaker};
use crate::error::{BackendError, CaptureErrorKind, ErrorKind, PlaybackError};
use crate::playback::{AudioPlayer, PlaybackEvents};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Sequences capture → transmit → render → speak → re-listen for one session
///
/// All transitions happen in [`TurnController::handle`], one event at a time.
/// Capture, the backend call and playback never overlap: capture is stopped
/// before a transcript is sent, and re-armed only once the turn completes.
pub struct TurnController {
    config: ControllerConfig,
    session: Session,
    capture: Box<dyn SpeechCapture>,
    backend: Arc<dyn DialogueBackend>,
    player: Box<dyn AudioPlayer>,
    sink: Arc<dyn ChatSink>,
    events: EventSender,
    inbox: EventInbox,
    next_turn_id: TurnId,
    backend_task: Option<JoinHandle<()>>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl TurnController {
    pub fn new(
        config: ControllerConfig,
        capture: Box<dyn SpeechCapture>,
        backend: Arc<dyn DialogueBackend>,
        player: Box<dyn AudioPlayer>,
        sink: Arc<dyn ChatSink>,
    ) -> Self {
        let session = Session::new(config.session_id.clone());
        let (snapshot_tx, _) = watch::channel(session.snapshot());
        let (events, inbox) = events::channel();

        info!(
            "Creating turn controller for session {} (capture={}, backend={}, player={}, continuous={})",
            session.id,
            capture.name(),
            backend.name(),
            player.name(),
            config.continuous
        );

        Self {
            config,
            session,
            capture,
            backend,
            player,
            sink,
            events,
            inbox,
            next_turn_id: 0,
            backend_task: None,
            snapshot_tx,
        }
    }

    /// Handle for posting gestures and adapter events into this controller
    pub fn sender(&self) -> EventSender {
        self.events.clone()
    }

    /// Watch the session snapshot, updated after every handled event
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    pub fn state(&self) -> TurnState {
        self.session.state
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Process events until shutdown
    pub async fn run(mut self) {
        info!("Turn controller running for session {}", self.session.id);

        while let Some(event) = self.inbox.recv().await {
            let shutdown = matches!(event, TurnEvent::Shutdown);
            self.handle(event).await;
            if shutdown {
                break;
            }
        }

        info!("Turn controller stopped for session {}", self.session.id);
    }

    /// Wait for the next queued event and handle it
    ///
    /// Returns false when the inbox is closed.
    pub async fn step(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(event) => {
                self.handle(event).await;
                true
            }
            None => false,
        }
    }

    /// Handle every event already queued; returns how many were handled
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.inbox.try_recv() {
            self.handle(event).await;
            handled += 1;
        }
        handled
    }

    /// Apply one event to the state machine
    pub async fn handle(&mut self, event: TurnEvent) {
        debug!("Handling {:?} in {:?}", event, self.session.state);

        match event {
            TurnEvent::BeginRequested => self.begin_turn().await,
            TurnEvent::StopRequested | TurnEvent::Shutdown => self.stop().await,
            TurnEvent::Capture { epoch, event } => {
                if !self.session.capture_active || epoch != self.session.capture_epoch {
                    debug!(
                        "Ignoring stale capture event {:?} (epoch {}, current {})",
                        event, epoch, self.session.capture_epoch
                    );
                } else {
                    self.on_capture(event).await;
                }
            }
            TurnEvent::Reply { turn, result } => {
                if self.session.state != TurnState::Sending || self.session.turn_id() != Some(turn) {
                    info!("Discarding reply for turn {} in {:?}", turn, self.session.state);
                } else {
                    self.on_reply(result).await;
                }
            }
            TurnEvent::Playback { turn, outcome } => {
                if self.session.state != TurnState::Speaking || self.session.turn_id() != Some(turn) {
                    debug!("Ignoring playback outcome for turn {} in {:?}", turn, self.session.state);
                } else {
                    self.on_playback(outcome).await;
                }
            }
        }

        self.snapshot_tx.send_replace(self.session.snapshot());
    }

    /// "Begin turn" gesture
    pub async fn begin_turn(&mut self) {
        match self.session.state {
            TurnState::Idle => {
                info!("Beginning turn for session {}", self.session.id);
                self.session.consecutive_capture_errors = 0;
                self.listen().await;
            }
            TurnState::Listening if !self.session.capture_active => self.listen().await,
            state => debug!("Begin turn ignored in {:?}", state),
        }
    }

    /// "Stop" gesture: release everything and go Idle
    pub async fn stop(&mut self) {
        if self.session.capture_active {
            self.release_capture().await;
        }

        if self.session.state == TurnState::Speaking || self.player.is_playing() {
            self.player.stop().await;
        }

        if let Some(task) = self.backend_task.take() {
            task.abort();
        }

        if self.session.state != TurnState::Idle {
            info!("Session {} stopped in {:?}", self.session.id, self.session.state);
        }

        self.session.pending_transcript = None;
        self.session.turn = None;
        self.session.state = TurnState::Idle;
    }

    async fn on_capture(&mut self, event: CaptureEvent) {
        match event {
            CaptureEvent::Transcript(text) if !text.trim().is_empty() => {
                self.release_capture().await;
                self.session.consecutive_capture_errors = 0;
                self.send_transcript(text.trim().to_string());
            }
            CaptureEvent::Transcript(_) | CaptureEvent::SpeechEnd => {
                self.release_capture().await;

                if self.config.continuous {
                    debug!("Speech ended without a transcript, listening again");
                    self.listen().await;
                } else {
                    info!("Speech ended without a transcript, going idle");
                    self.session.state = TurnState::Idle;
                }
            }
            CaptureEvent::Error(kind) => {
                self.release_capture().await;
                if self.record_capture_error(kind) {
                    self.listen().await;
                }
            }
        }
    }

    fn send_transcript(&mut self, transcript: String) {
        self.next_turn_id += 1;
        let turn = self.next_turn_id;

        self.sink.render(Speaker::User, &transcript);

        self.session.turn = Some(Turn {
            id: turn,
            transcript: transcript.clone(),
            reply: None,
        });
        self.session.pending_transcript = Some(transcript.clone());
        self.session.state = TurnState::Sending;

        info!("Turn {}: sending transcript to {}", turn, self.backend.name());

        let backend = Arc::clone(&self.backend);
        let events = self.events.clone();

        self.backend_task = Some(tokio::spawn(async move {
            let result = backend.send(&transcript).await;
            events.send(TurnEvent::Reply { turn, result });
        }));
    }

    async fn on_reply(&mut self, result: Result<Reply, BackendError>) {
        self.backend_task = None;
        self.session.pending_transcript = None;

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Backend failed: {}", e);
                self.session.state = TurnState::Erroring;
                self.session.last_error = Some(ErrorKind::from(e.clone()));

                let notice = format!("{} ({})", self.config.backend_error_notice, e);
                self.sink.render(Speaker::System, &notice);

                self.complete_turn().await;
                return;
            }
        };

        self.sink.render(Speaker::Bot, &reply.text);

        let audio = reply.audio().map(str::to_string);
        if let Some(turn) = self.session.turn.as_mut() {
            turn.reply = Some(reply);
        }

        match audio {
            Some(uri) => self.speak(uri).await,
            None => {
                debug!("Reply has no audio, skipping playback");
                self.complete_turn().await;
            }
        }
    }

    async fn speak(&mut self, uri: String) {
        let Some(turn) = self.session.turn_id() else {
            error!("No turn in flight for playback of {}", uri);
            self.session.state = TurnState::Idle;
            return;
        };

        self.session.state = TurnState::Speaking;
        let events = PlaybackEvents::new(turn, self.events.clone());

        match self.player.play(&uri, events).await {
            Ok(()) => info!("Turn {}: playing {}", turn, uri),
            Err(e) => self.on_playback(PlaybackOutcome::Failed(e)).await,
        }
    }

    async fn on_playback(&mut self, outcome: PlaybackOutcome) {
        if let PlaybackOutcome::Failed(e) = outcome {
            self.playback_failed(e);
        }
        self.complete_turn().await;
    }

    fn playback_failed(&mut self, error: PlaybackError) {
        warn!("Playback failed, treating as ended: {}", error);
        self.session.last_error = Some(ErrorKind::from(error));
    }

    /// Close the turn in flight and re-listen, exactly once per turn
    async fn complete_turn(&mut self) {
        if let Some(turn) = self.session.turn.take() {
            debug!("Turn {} complete", turn.id);
        }
        self.session.turns_completed += 1;
        self.listen().await;
    }

    /// Arm capture, retrying start failures under the capture error policy
    async fn listen(&mut self) {
        loop {
            match self.start_capture().await {
                Ok(()) => return,
                Err(kind) => {
                    if !self.record_capture_error(kind) {
                        return;
                    }
                }
            }
        }
    }

    async fn start_capture(&mut self) -> Result<(), CaptureErrorKind> {
        self.session.state = TurnState::Listening;

        if self.session.capture_active {
            warn!("Capture already active, not starting it again");
            return Ok(());
        }

        self.session.capture_epoch += 1;
        let events = CaptureEvents::new(self.session.capture_epoch, self.events.clone());

        self.capture.start(events).await?;
        self.session.capture_active = true;

        info!("Listening (capture epoch {})", self.session.capture_epoch);
        Ok(())
    }

    async fn release_capture(&mut self) {
        self.capture.stop().await;
        self.session.capture_active = false;
    }

    /// Count a capture error; returns whether to listen again
    fn record_capture_error(&mut self, kind: CaptureErrorKind) -> bool {
        self.session.state = TurnState::Erroring;
        self.session.consecutive_capture_errors += 1;
        self.session.last_error = Some(ErrorKind::from(kind.clone()));

        if self.session.consecutive_capture_errors >= self.config.max_consecutive_capture_errors {
            error!(
                "Capture failed {} times in a row ({}), going idle",
                self.session.consecutive_capture_errors, kind
            );
            self.sink.render(Speaker::System, &self.config.capture_give_up_notice);
            self.session.state = TurnState::Idle;
            false
        } else {
            warn!("Capture error ({}), listening again", kind);
            true
        }
    }
}
