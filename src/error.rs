//! Error taxonomy for the conversation loop
//!
//! None of these are ever returned past the turn controller: capture and
//! playback errors drive state transitions, backend errors are rendered as
//! system messages.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Speech recognition failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum CaptureErrorKind {
    /// Microphone or recognition service access refused
    #[error("microphone permission denied")]
    PermissionDenied,

    /// Recognition ended without detecting speech
    #[error("no speech detected")]
    NoSpeech,

    /// Recognition aborted by the platform
    #[error("recognition aborted")]
    Aborted,

    /// Recognition service unreachable
    #[error("recognition network failure")]
    Network,

    /// Anything else the recognizer reports
    #[error("recognition error: {0}")]
    Other(String),
}

impl CaptureErrorKind {
    /// Map a recognizer error code (Web Speech API naming) to a kind
    pub fn from_code(code: &str) -> Self {
        match code {
            "not-allowed" | "service-not-allowed" => Self::PermissionDenied,
            "no-speech" => Self::NoSpeech,
            "aborted" => Self::Aborted,
            "network" => Self::Network,
            other => Self::Other(other.to_string()),
        }
    }
}

/// Dialogue backend failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum BackendError {
    /// Request never produced a response (connect/reset/DNS)
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// Response body was not a valid reply
    #[error("malformed backend response: {0}")]
    BadResponse(String),

    /// Backend answered with a non-success status
    #[error("backend returned HTTP {0}")]
    HttpStatus(u16),

    /// Bounded wait expired
    #[error("backend timed out after {0}ms")]
    Timeout(u64),
}

/// Reply audio failures
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum PlaybackError {
    /// Asset could not be decoded
    #[error("audio decode failed: {0}")]
    Decode(String),

    /// Asset could not be fetched
    #[error("audio fetch failed: {0}")]
    Network(String),

    /// Output refused to start without a user gesture
    #[error("autoplay blocked")]
    AutoplayBlocked,

    /// No audio output device could be opened
    #[error("audio output unavailable: {0}")]
    Device(String),

    /// A previous playback has not resolved yet
    #[error("previous playback still unresolved")]
    Busy,
}

/// The last error a session ran into
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "error")]
pub enum ErrorKind {
    #[error(transparent)]
    Capture(#[from] CaptureErrorKind),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Playback(#[from] PlaybackError),
}
