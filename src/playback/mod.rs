//! Reply audio playback
//!
//! A reply's `audioUrl` is fetched with a cache-busting query parameter,
//! decoded, and played on the output device until the sink drains.
//! Completion or failure is reported exactly once per playback.

mod asset;
pub mod decode;
mod device;
mod player;

pub use asset::{AssetLocation, AssetPlayer, PlaybackConfig, PlaybackOutput};
pub use decode::DecodedAudio;
pub use player::{cache_busted, AudioPlayer, PlaybackEvents};
