//! HTTP control API
//!
//! Exposes the conversation's two gestures and its state:
//! - POST /conversation/turn - Begin a turn (start listening)
//! - POST /conversation/stop - Stop listening/speaking, go idle
//! - GET /conversation/status - Session snapshot
//! - GET /conversation/messages - Rendered chat lines
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
