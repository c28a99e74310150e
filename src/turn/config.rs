use serde::{Deserialize, Serialize};

/// Turn-taking policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Session identifier (e.g., "chat-7f3a...")
    pub session_id: String,

    /// Hands-free mode: re-arm capture when speech ends without a transcript.
    /// When false (push-to-talk) the session goes Idle instead.
    pub continuous: bool,

    /// Consecutive capture errors (no transcript in between) before giving up
    /// and waiting for a fresh gesture
    pub max_consecutive_capture_errors: u32,

    /// System line rendered when the backend fails
    pub backend_error_notice: String,

    /// System line rendered when capture gives up
    pub capture_give_up_notice: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            session_id: format!("chat-{}", uuid::Uuid::new_v4()),
            continuous: false,
            max_consecutive_capture_errors: 2,
            backend_error_notice:
                "There was a problem processing your request. Please try again.".to_string(),
            capture_give_up_notice:
                "Voice input stopped after repeated errors. Start a new turn to continue."
                    .to_string(),
        }
    }
}
