//! Dialogue backend client
//!
//! One `POST /process` per turn: the transcript goes out as `{"text": ...}`,
//! the reply comes back as text plus an optional synthesized audio URI.

mod client;
mod http;
pub mod messages;

pub use client::{DialogueBackend, Reply};
pub use http::{BackendConfig, HttpBackend};
pub use messages::{ProcessRequest, ProcessResponse};
