use crate::chat::ChatLog;
use crate::turn::{EventSender, SessionSnapshot};
use tokio::sync::watch;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Inbox of the session's turn controller
    pub events: EventSender,

    /// Latest session snapshot
    pub status: watch::Receiver<SessionSnapshot>,

    /// Rendered chat lines
    pub chat: ChatLog,
}

impl AppState {
    pub fn new(events: EventSender, status: watch::Receiver<SessionSnapshot>, chat: ChatLog) -> Self {
        Self {
            events,
            status,
            chat,
        }
    }
}
