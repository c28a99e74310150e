//! Turn-taking controller
//!
//! This module provides the `TurnController` state machine that decides:
//! - When speech capture listens and when it is suppressed
//! - When a transcript goes to the dialogue backend
//! - When reply audio plays
//! - How capture, backend and playback failures recover

mod config;
mod controller;
mod events;
mod state;

pub use config::ControllerConfig;
pub use controller::TurnController;
pub use events::{
    channel, CaptureEpoch, CaptureEvent, EventInbox, EventSender, PlaybackOutcome, TurnEvent,
    TurnId,
};
pub use state::{Session, SessionSnapshot, Turn, TurnState};
