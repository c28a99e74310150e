use super::decode::{self, DecodedAudio};
use super::device::{self, OutputControl};
use super::player::{cache_busted, AudioPlayer, PlaybackEvents};
use crate::error::PlaybackError;
use base64::Engine;
use chrono::Utc;
use reqwest::Url;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Where decoded reply audio goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackOutput {
    /// Default audio output device
    #[default]
    Device,
    /// No device; hold for the clip's duration (headless)
    Paced,
    /// No device; resolve as soon as the clip is decoded
    Null,
}

/// Configuration for reply audio playback
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybackConfig {
    /// Base for relative audio URIs; usually the backend base URL
    #[serde(default)]
    pub asset_base_url: Option<String>,

    /// When false, every playback is refused as autoplay-blocked
    #[serde(default = "default_true")]
    pub autoplay: bool,

    /// Output device, or a headless stand-in
    #[serde(default)]
    pub output: PlaybackOutput,

    /// Directory receiving a WAV copy of every played reply
    #[serde(default)]
    pub save_dir: Option<PathBuf>,

    /// Bounded wait for fetching one asset
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

fn default_true() -> bool {
    true
}

fn default_fetch_timeout_ms() -> u64 {
    10_000
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            asset_base_url: None,
            autoplay: true,
            output: PlaybackOutput::Device,
            save_dir: None,
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }
}

/// Where a reply's audio comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetLocation {
    Http(Url),
    File(PathBuf),
    /// Payload of a `data:` URI plus its media type
    Data { media_type: String, payload: String },
}

impl AssetLocation {
    /// Resolve a reply URI, relative ones against `base`
    pub fn resolve(uri: &str, base: Option<&str>) -> Result<Self, PlaybackError> {
        if let Some(rest) = uri.strip_prefix("data:") {
            let (meta, payload) = rest
                .split_once(',')
                .ok_or_else(|| PlaybackError::Decode("malformed data URI".to_string()))?;
            let media_type = meta
                .strip_suffix(";base64")
                .ok_or_else(|| PlaybackError::Decode("data URI is not base64".to_string()))?;
            return Ok(Self::Data {
                media_type: media_type.to_string(),
                payload: payload.to_string(),
            });
        }

        if let Ok(url) = Url::parse(uri) {
            return match url.scheme() {
                "http" | "https" => Ok(Self::Http(url)),
                "file" => url
                    .to_file_path()
                    .map(Self::File)
                    .map_err(|_| PlaybackError::Network(format!("bad file URI: {}", uri))),
                scheme => Err(PlaybackError::Network(format!(
                    "unsupported audio scheme: {}",
                    scheme
                ))),
            };
        }

        match base {
            Some(base) => {
                let base = Url::parse(base)
                    .map_err(|e| PlaybackError::Network(format!("bad asset base URL: {}", e)))?;
                base.join(uri)
                    .map(Self::Http)
                    .map_err(|e| PlaybackError::Network(e.to_string()))
            }
            None => Ok(Self::File(PathBuf::from(uri))),
        }
    }
}

/// Plays reply assets: fetch (cache-busted), decode, play on the configured output
pub struct AssetPlayer {
    config: PlaybackConfig,
    client: reqwest::Client,
    task: Option<JoinHandle<()>>,
    output: Option<Arc<OutputControl>>,
}

impl AssetPlayer {
    pub fn new(config: PlaybackConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .build()?;

        if let Some(dir) = &config.save_dir {
            std::fs::create_dir_all(dir)?;
            info!("Saving reply audio to {}", dir.display());
        }

        Ok(Self {
            config,
            client,
            task: None,
            output: None,
        })
    }

    async fn fetch(client: &reqwest::Client, location: &AssetLocation) -> Result<Vec<u8>, PlaybackError> {
        match location {
            AssetLocation::Http(url) => {
                let busted = cache_busted(url.as_str(), Utc::now().timestamp_millis());
                debug!("Fetching reply audio {}", busted);

                let response = client
                    .get(&busted)
                    .send()
                    .await
                    .map_err(|e| PlaybackError::Network(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(PlaybackError::Network(format!("HTTP {}", status.as_u16())));
                }

                let bytes = response
                    .bytes()
                    .await
                    .map_err(|e| PlaybackError::Network(e.to_string()))?;
                Ok(bytes.to_vec())
            }
            AssetLocation::File(path) => tokio::fs::read(path)
                .await
                .map_err(|e| PlaybackError::Network(format!("{}: {}", path.display(), e))),
            AssetLocation::Data {
                media_type,
                payload,
            } => {
                debug!("Reading inline {} reply audio", media_type);
                base64::engine::general_purpose::STANDARD
                    .decode(payload.trim())
                    .map_err(|e| PlaybackError::Decode(e.to_string()))
            }
        }
    }

    async fn play_asset(
        client: reqwest::Client,
        location: AssetLocation,
        output: PlaybackOutput,
        save_path: Option<PathBuf>,
        control: Arc<OutputControl>,
    ) -> Result<Duration, PlaybackError> {
        let bytes = Self::fetch(&client, &location).await?;

        let audio: DecodedAudio = tokio::task::spawn_blocking(move || {
            let audio = decode::decode(bytes)?;
            if let Some(path) = save_path {
                if let Err(e) = audio.write_wav(&path) {
                    warn!("Failed to save reply audio to {}: {}", path.display(), e);
                }
            }
            Ok::<_, PlaybackError>(audio)
        })
        .await
        .map_err(|e| PlaybackError::Decode(format!("decoder task failed: {}", e)))??;

        let duration = audio.duration();
        match output {
            PlaybackOutput::Device => {
                tokio::task::spawn_blocking(move || device::play_blocking(&audio, &control))
                    .await
                    .map_err(|e| PlaybackError::Device(format!("output task failed: {}", e)))??;
            }
            PlaybackOutput::Paced => tokio::time::sleep(duration).await,
            PlaybackOutput::Null => {}
        }

        Ok(duration)
    }
}

#[async_trait::async_trait]
impl AudioPlayer for AssetPlayer {
    async fn play(&mut self, uri: &str, events: PlaybackEvents) -> Result<(), PlaybackError> {
        if !self.config.autoplay {
            return Err(PlaybackError::AutoplayBlocked);
        }

        if self.is_playing() {
            warn!("Previous playback still running, refusing {}", uri);
            return Err(PlaybackError::Busy);
        }

        let location = AssetLocation::resolve(uri, self.config.asset_base_url.as_deref())?;
        let save_path = self
            .config
            .save_dir
            .as_ref()
            .map(|dir| dir.join(format!("reply-{:04}.wav", events.turn())));

        let client = self.client.clone();
        let output = self.config.output;
        let control = OutputControl::new();
        self.output = Some(Arc::clone(&control));
        let uri = uri.to_string();

        self.task = Some(tokio::spawn(async move {
            match AssetPlayer::play_asset(client, location, output, save_path, control).await {
                Ok(duration) => {
                    info!("Finished playing {} ({:.1}s)", uri, duration.as_secs_f64());
                    events.ended();
                }
                Err(e) => {
                    error!("Playback of {} failed: {}", uri, e);
                    events.failed(e);
                }
            }
        }));

        Ok(())
    }

    async fn stop(&mut self) {
        if let Some(control) = self.output.take() {
            control.stop();
        }
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                info!("Stopping reply playback");
            }
            task.abort();
        }
    }

    fn is_playing(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn name(&self) -> &str {
        "asset"
    }
}
