use crate::error::PlaybackError;
use crate::turn::{EventSender, PlaybackOutcome, TurnEvent, TurnId};

/// Reply audio player trait
#[async_trait::async_trait]
pub trait AudioPlayer: Send {
    /// Begin playing `uri`
    ///
    /// Returns once playback has started; the outcome is reported through
    /// `events`. Refused while a previous playback is unresolved.
    async fn play(&mut self, uri: &str, events: PlaybackEvents) -> Result<(), PlaybackError>;

    /// Cancel any playback in flight. Safe to call at any time.
    async fn stop(&mut self);

    /// Check if a playback is unresolved
    fn is_playing(&self) -> bool;

    /// Get player name for logging
    fn name(&self) -> &str;
}

/// Completion handle for one playback
///
/// Consumed on resolution, so a playback reports at most once.
#[derive(Debug)]
pub struct PlaybackEvents {
    turn: TurnId,
    tx: EventSender,
}

impl PlaybackEvents {
    pub fn new(turn: TurnId, tx: EventSender) -> Self {
        Self { turn, tx }
    }

    pub fn turn(&self) -> TurnId {
        self.turn
    }

    pub fn ended(self) -> bool {
        self.resolve(PlaybackOutcome::Ended)
    }

    pub fn failed(self, error: PlaybackError) -> bool {
        self.resolve(PlaybackOutcome::Failed(error))
    }

    pub fn resolve(self, outcome: PlaybackOutcome) -> bool {
        self.tx.send(TurnEvent::Playback {
            turn: self.turn,
            outcome,
        })
    }
}

/// Append a cache-defeating `t=<stamp>` query parameter
pub fn cache_busted(uri: &str, stamp: i64) -> String {
    let (base, fragment) = match uri.split_once('#') {
        Some((base, fragment)) => (base, Some(fragment)),
        None => (uri, None),
    };

    let separator = if base.contains('?') { '&' } else { '?' };
    let mut busted = format!("{}{}t={}", base, separator, stamp);

    if let Some(fragment) = fragment {
        busted.push('#');
        busted.push_str(fragment);
    }

    busted
}
