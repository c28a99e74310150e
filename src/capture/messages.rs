use super::source::RecognitionResult;
use serde::{Deserialize, Serialize};

/// Event published by the speech-recognition service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionMessage {
    /// Accumulated results; `result_index` is the first entry that changed
    Result {
        session_id: String,
        result_index: usize,
        results: Vec<RecognitionResult>,
    },
    /// Recognition failed (`not-allowed`, `no-speech`, `aborted`, `network`, ...)
    Error {
        session_id: String,
        error: String,
        #[serde(default)]
        message: Option<String>,
    },
    /// Input stream closed
    SpeechEnd { session_id: String },
}

impl RecognitionMessage {
    pub fn session_id(&self) -> &str {
        match self {
            Self::Result { session_id, .. }
            | Self::Error { session_id, .. }
            | Self::SpeechEnd { session_id } => session_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlCommand {
    Start,
    Stop,
}

/// Start/stop request sent to the speech-recognition service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlMessage {
    pub session_id: String,
    pub command: ControlCommand,
    pub lang: String,
    /// Only final results are wanted
    pub interim_results: bool,
    pub max_alternatives: u32,
    pub timestamp: String, // RFC3339 timestamp
}
