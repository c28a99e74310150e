use super::events::{CaptureEpoch, TurnId};
use crate::backend::Reply;
use crate::error::ErrorKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Where the conversation currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnState {
    /// Quiescent; waits for a "begin turn" gesture
    Idle,
    /// Capture armed
    Listening,
    /// Transcript sent, awaiting the backend
    Sending,
    /// Reply audio playing
    Speaking,
    /// Handling a failure; resolves to Listening or Idle within the same event
    Erroring,
}

/// One utterance → reply cycle
#[derive(Debug, Clone)]
pub struct Turn {
    pub id: TurnId,
    pub transcript: String,
    pub reply: Option<Reply>,
}

/// The single live conversation owned by a turn controller
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub state: TurnState,

    /// Transcript sent to the backend and not yet answered
    pub pending_transcript: Option<String>,

    pub last_error: Option<ErrorKind>,

    /// Whether the capture source has been started and not yet stopped
    pub capture_active: bool,

    /// Epoch of the most recent capture start
    pub capture_epoch: CaptureEpoch,

    /// Capture errors since the last successful transcript or gesture
    pub consecutive_capture_errors: u32,

    /// Turn in flight (Sending or Speaking)
    pub turn: Option<Turn>,

    /// Turns completed, including error-completed ones
    pub turns_completed: u64,

    pub started_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            state: TurnState::Idle,
            pending_transcript: None,
            last_error: None,
            capture_active: false,
            capture_epoch: 0,
            consecutive_capture_errors: 0,
            turn: None,
            turns_completed: 0,
            started_at: Utc::now(),
        }
    }

    /// Id of the turn in flight, if any
    pub fn turn_id(&self) -> Option<TurnId> {
        self.turn.as_ref().map(|t| t.id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.clone(),
            state: self.state,
            capture_active: self.capture_active,
            pending_transcript: self.pending_transcript.clone(),
            turns_completed: self.turns_completed,
            consecutive_capture_errors: self.consecutive_capture_errors,
            last_error: self.last_error.clone(),
            started_at: self.started_at,
            updated_at: Utc::now(),
        }
    }
}

/// Serializable view of a session, published after every handled event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub state: TurnState,
    pub capture_active: bool,
    pub pending_transcript: Option<String>,
    pub turns_completed: u64,
    pub consecutive_capture_errors: u32,
    pub last_error: Option<ErrorKind>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
