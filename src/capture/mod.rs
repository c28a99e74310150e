//! Speech capture sources
//!
//! A capture source listens for one utterance per start and reports it as a
//! transcript, an error, or an end of speech without a transcript.

mod line;
pub mod messages;
mod nats;
mod source;

pub use line::LineCapture;
pub use messages::{ControlCommand, ControlMessage, RecognitionMessage};
pub use nats::NatsCapture;
pub use source::{CaptureEvents, RecognitionResult, ResultCursor, SpeechCapture};
