//! Chat rendering
//!
//! The turn controller reports every exchange as (speaker, text) pairs to a
//! [`ChatSink`]. [`ChatLog`] keeps them in order for the control API and can
//! echo them to the console.

mod log;

pub use log::{ChatLog, ChatMessage};

use serde::{Deserialize, Serialize};

/// Who said a rendered line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Bot,
    System,
}

/// Receives chat lines in the order the controller emits them
pub trait ChatSink: Send + Sync {
    /// Render one line. Fire-and-forget.
    fn render(&self, speaker: Speaker, text: &str);
}
