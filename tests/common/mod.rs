// Scripted adapters for driving a TurnController in tests
#![allow(dead_code)]

use loqa_voice_chat::backend::{DialogueBackend, Reply};
use loqa_voice_chat::capture::{CaptureEvents, SpeechCapture};
use loqa_voice_chat::chat::{ChatLog, Speaker};
use loqa_voice_chat::error::{BackendError, CaptureErrorKind, PlaybackError};
use loqa_voice_chat::playback::{AudioPlayer, PlaybackEvents};
use loqa_voice_chat::turn::{ControllerConfig, TurnController};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Capture
// ============================================================================

#[derive(Default)]
pub struct CaptureLog {
    pub starts: usize,
    pub stops: usize,
    pub active: bool,
    /// start() calls made while already active
    pub double_starts: usize,
    /// Scripted start() failures, consumed first
    pub start_failures: VecDeque<CaptureErrorKind>,
    pub events: Option<CaptureEvents>,
    /// Handles from every successful start, oldest first
    pub history: Vec<CaptureEvents>,
}

#[derive(Clone, Default)]
pub struct FakeCapture {
    pub log: Arc<Mutex<CaptureLog>>,
}

impl FakeCapture {
    pub fn starts(&self) -> usize {
        self.log.lock().unwrap().starts
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }

    pub fn is_active(&self) -> bool {
        self.log.lock().unwrap().active
    }

    pub fn double_starts(&self) -> usize {
        self.log.lock().unwrap().double_starts
    }

    pub fn fail_next_start(&self, kind: CaptureErrorKind) {
        self.log.lock().unwrap().start_failures.push_back(kind);
    }

    fn current(&self) -> CaptureEvents {
        self.log
            .lock()
            .unwrap()
            .events
            .clone()
            .expect("capture was never started")
    }

    /// Handle from the n-th successful start (0-based)
    pub fn handle(&self, n: usize) -> CaptureEvents {
        self.log.lock().unwrap().history[n].clone()
    }

    pub fn say(&self, text: &str) {
        self.current().transcript(text);
    }

    pub fn fail(&self, kind: CaptureErrorKind) {
        self.current().error(kind);
    }

    pub fn end_speech(&self) {
        self.current().speech_end();
    }
}

#[async_trait::async_trait]
impl SpeechCapture for FakeCapture {
    async fn start(&mut self, events: CaptureEvents) -> Result<(), CaptureErrorKind> {
        let mut log = self.log.lock().unwrap();
        if log.active {
            log.double_starts += 1;
            return Ok(());
        }
        if let Some(kind) = log.start_failures.pop_front() {
            return Err(kind);
        }
        log.starts += 1;
        log.active = true;
        log.history.push(events.clone());
        log.events = Some(events);
        Ok(())
    }

    async fn stop(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        log.active = false;
    }

    fn is_capturing(&self) -> bool {
        self.log.lock().unwrap().active
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Default)]
pub struct BackendLog {
    pub sent: Vec<String>,
    pub replies: VecDeque<Result<Reply, BackendError>>,
}

#[derive(Clone, Default)]
pub struct ScriptedBackend {
    pub log: Arc<Mutex<BackendLog>>,
    /// When set, every send waits for a notification before answering
    pub gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    pub fn replying(replies: Vec<Result<Reply, BackendError>>) -> Self {
        let backend = Self::default();
        backend.log.lock().unwrap().replies = replies.into();
        backend
    }

    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    pub fn sent(&self) -> Vec<String> {
        self.log.lock().unwrap().sent.clone()
    }
}

#[async_trait::async_trait]
impl DialogueBackend for ScriptedBackend {
    async fn send(&self, text: &str) -> Result<Reply, BackendError> {
        let reply = {
            let mut log = self.log.lock().unwrap();
            log.sent.push(text.to_string());
            log.replies
                .pop_front()
                .unwrap_or_else(|| Ok(Reply::new(format!("echo: {}", text), None)))
        };

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        reply
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

// ============================================================================
// Player
// ============================================================================

#[derive(Default)]
pub struct PlayerLog {
    pub played: Vec<String>,
    pub stops: usize,
    pub pending: Option<PlaybackEvents>,
    /// Scripted play() refusals, consumed first
    pub refusals: VecDeque<PlaybackError>,
    /// play() calls made while a playback was unresolved
    pub overlapping: usize,
}

#[derive(Clone, Default)]
pub struct FakePlayer {
    pub log: Arc<Mutex<PlayerLog>>,
}

impl FakePlayer {
    pub fn played(&self) -> Vec<String> {
        self.log.lock().unwrap().played.clone()
    }

    pub fn stops(&self) -> usize {
        self.log.lock().unwrap().stops
    }

    pub fn refuse_next(&self, error: PlaybackError) {
        self.log.lock().unwrap().refusals.push_back(error);
    }

    pub fn overlapping(&self) -> usize {
        self.log.lock().unwrap().overlapping
    }

    pub fn finish(&self) {
        let events = self.log.lock().unwrap().pending.take().expect("nothing playing");
        events.ended();
    }

    pub fn break_playback(&self, error: PlaybackError) {
        let events = self.log.lock().unwrap().pending.take().expect("nothing playing");
        events.failed(error);
    }
}

#[async_trait::async_trait]
impl AudioPlayer for FakePlayer {
    async fn play(&mut self, uri: &str, events: PlaybackEvents) -> Result<(), PlaybackError> {
        let mut log = self.log.lock().unwrap();
        if log.pending.is_some() {
            log.overlapping += 1;
            return Err(PlaybackError::Busy);
        }
        if let Some(error) = log.refusals.pop_front() {
            return Err(error);
        }
        log.played.push(uri.to_string());
        log.pending = Some(events);
        Ok(())
    }

    async fn stop(&mut self) {
        let mut log = self.log.lock().unwrap();
        log.stops += 1;
        log.pending = None;
    }

    fn is_playing(&self) -> bool {
        self.log.lock().unwrap().pending.is_some()
    }

    fn name(&self) -> &str {
        "fake"
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub controller: TurnController,
    pub capture: FakeCapture,
    pub backend: ScriptedBackend,
    pub player: FakePlayer,
    pub chat: ChatLog,
}

impl Harness {
    pub fn new(config: ControllerConfig, backend: ScriptedBackend) -> Self {
        let capture = FakeCapture::default();
        let player = FakePlayer::default();
        let chat = ChatLog::default();

        let controller = TurnController::new(
            config,
            Box::new(capture.clone()),
            Arc::new(backend.clone()),
            Box::new(player.clone()),
            Arc::new(chat.clone()),
        );

        Self {
            controller,
            capture,
            backend,
            player,
            chat,
        }
    }

    pub fn with_replies(replies: Vec<Result<Reply, BackendError>>) -> Self {
        Self::new(ControllerConfig::default(), ScriptedBackend::replying(replies))
    }

    /// Handle the next event, waiting for it if necessary
    pub async fn step(&mut self) {
        assert!(self.controller.step().await, "controller inbox closed");
    }

    pub fn rendered(&self) -> Vec<(Speaker, String)> {
        self.chat
            .messages()
            .into_iter()
            .map(|m| (m.speaker, m.text))
            .collect()
    }
}
