pub mod backend;
pub mod capture;
pub mod chat;
pub mod config;
pub mod error;
pub mod http;
pub mod playback;
pub mod turn;

pub use backend::{BackendConfig, DialogueBackend, HttpBackend, Reply};
pub use capture::{CaptureEvents, LineCapture, NatsCapture, SpeechCapture};
pub use chat::{ChatLog, ChatMessage, ChatSink, Speaker};
pub use config::Config;
pub use error::{BackendError, CaptureErrorKind, ErrorKind, PlaybackError};
pub use http::{create_router, AppState};
pub use playback::{AssetPlayer, AudioPlayer, PlaybackConfig, PlaybackEvents};
pub use turn::{ControllerConfig, EventSender, SessionSnapshot, TurnController, TurnEvent, TurnState};
