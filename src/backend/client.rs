use crate::error::BackendError;
use serde::{Deserialize, Serialize};

/// What the dialogue backend answered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    /// Text to render for the bot
    pub text: String,

    /// Synthesized speech for `text`, relative or absolute
    pub audio_ref: Option<String>,
}

impl Reply {
    pub fn new(text: impl Into<String>, audio_ref: Option<String>) -> Self {
        Self {
            text: text.into(),
            audio_ref,
        }
    }

    /// Audio reference, treating an empty string as absent
    pub fn audio(&self) -> Option<&str> {
        self.audio_ref
            .as_deref()
            .map(str::trim)
            .filter(|uri| !uri.is_empty())
    }
}

/// Dialogue backend trait
///
/// One request/response exchange per transcript. Duplicate sends are
/// distinct turns.
#[async_trait::async_trait]
pub trait DialogueBackend: Send + Sync {
    async fn send(&self, text: &str) -> Result<Reply, BackendError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
