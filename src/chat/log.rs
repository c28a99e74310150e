use super::{ChatSink, Speaker};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tracing::info;

/// A single rendered chat line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
    /// When the line was rendered
    pub timestamp: DateTime<Utc>,
}

/// In-memory, order-preserving chat transcript
#[derive(Clone)]
pub struct ChatLog {
    messages: Arc<Mutex<Vec<ChatMessage>>>,
    /// Label printed before bot lines when echoing (e.g. "Alice:")
    bot_label: String,
    echo: bool,
}

impl ChatLog {
    pub fn new(bot_name: impl Into<String>) -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            bot_label: format!("{}:", bot_name.into()),
            echo: false,
        }
    }

    /// Also print every line to stdout
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Copy of everything rendered so far
    pub fn messages(&self) -> Vec<ChatMessage> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.messages().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn label(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::User => "You:",
            Speaker::Bot => &self.bot_label,
            Speaker::System => "[system]",
        }
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new("Alice")
    }
}

impl ChatSink for ChatLog {
    fn render(&self, speaker: Speaker, text: &str) {
        let message = ChatMessage {
            speaker,
            text: text.to_string(),
            timestamp: Utc::now(),
        };

        {
            let mut messages = match self.messages.lock() {
                Ok(messages) => messages,
                Err(poisoned) => poisoned.into_inner(),
            };
            messages.push(message);
        }

        info!(?speaker, "{}", text);

        if self.echo {
            println!("{} {}", self.label(speaker), text);
        }
    }
}
