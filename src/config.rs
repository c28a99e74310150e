use crate::backend::BackendConfig;
use crate::playback::PlaybackConfig;
use crate::turn::ControllerConfig;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub conversation: ConversationConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "loqa-voice-chat".to_string(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub enabled: bool,
    pub bind: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    /// Re-arm capture when speech ends without a transcript
    pub continuous: bool,
    pub max_consecutive_capture_errors: u32,
    /// Name shown for bot lines
    pub bot_name: String,
    /// Print chat lines to the console
    pub echo: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            max_consecutive_capture_errors: 2,
            bot_name: "Alice".to_string(),
            echo: true,
        }
    }
}

/// Where utterances come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    /// Typed lines on stdin
    Stdin,
    /// Recognition service on NATS
    Nats,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub source: CaptureSource,
    pub nats_url: String,
    /// Recognition language
    pub lang: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: CaptureSource::Stdin,
            nats_url: "nats://localhost:4222".to_string(),
            lang: "en-US".to_string(),
        }
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("VOICE_CHAT").separator("__")
}

impl Config {
    /// Load `<path>.{toml,yaml,json}` if present, then `VOICE_CHAT__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: &str, env: config::Environment) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Turn-taking policy for a new session
    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            continuous: self.conversation.continuous,
            max_consecutive_capture_errors: self.conversation.max_consecutive_capture_errors,
            ..ControllerConfig::default()
        }
    }

    /// Playback settings, resolving relative audio against the backend by default
    pub fn playback_config(&self) -> PlaybackConfig {
        let mut playback = self.playback.clone();
        if playback.asset_base_url.is_none() {
            playback.asset_base_url = Some(self.backend.base_url.clone());
        }
        playback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent");
        let cfg = Config::load(path.to_str().unwrap()).unwrap();

        assert_eq!(cfg.backend.endpoint(), "http://127.0.0.1:5000/process");
        assert_eq!(cfg.capture.source, CaptureSource::Stdin);
        assert!(!cfg.conversation.continuous);
        assert_eq!(cfg.service.http.port, 7070);
    }

    #[test]
    fn test_single_env_override_without_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("absent");

        let mut vars = config::Map::new();
        vars.insert("VOICE_CHAT__SERVICE__HTTP__PORT".to_string(), "8080".to_string());
        vars.insert("VOICE_CHAT__BACKEND__PROCESS_PATH".to_string(), "/api/turn".to_string());

        let cfg = Config::load_with_env(path.to_str().unwrap(), environment().source(Some(vars)))
            .unwrap();

        assert_eq!(cfg.service.http.port, 8080);
        assert_eq!(cfg.service.http.bind, "127.0.0.1");
        assert!(cfg.service.http.enabled);
        assert_eq!(cfg.service.name, "loqa-voice-chat");
        assert_eq!(cfg.backend.endpoint(), "http://127.0.0.1:5000/api/turn");
        assert_eq!(cfg.backend.request_timeout_ms, Some(30_000));
    }

    #[test]
    fn test_partial_service_table() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("voice-chat.toml");
        std::fs::write(&path, "[service.http]\nport = 9090\n\n[backend]\nprocess_path = \"/turn\"\n")
            .unwrap();

        let cfg = Config::load(dir.path().join("voice-chat").to_str().unwrap()).unwrap();
        assert_eq!(cfg.service.http.port, 9090);
        assert_eq!(cfg.service.http.bind, "127.0.0.1");
        assert_eq!(cfg.backend.base_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_load_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("voice-chat.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"
[service]
name = "kiosk"
[service.http]
bind = "0.0.0.0"
port = 8080

[backend]
base_url = "http://dialogue:5000"
request_timeout_ms = 5000

[conversation]
continuous = true
bot_name = "Rasa"

[capture]
source = "nats"
"#
        )
        .unwrap();

        let cfg = Config::load(dir.path().join("voice-chat").to_str().unwrap()).unwrap();
        assert_eq!(cfg.service.name, "kiosk");
        assert!(cfg.service.http.enabled);
        assert_eq!(cfg.backend.request_timeout_ms, Some(5000));
        assert_eq!(cfg.capture.source, CaptureSource::Nats);
        assert_eq!(cfg.capture.lang, "en-US");
        assert_eq!(cfg.conversation.max_consecutive_capture_errors, 2);

        let controller = cfg.controller_config();
        assert!(controller.continuous);

        let playback = cfg.playback_config();
        assert_eq!(playback.asset_base_url.as_deref(), Some("http://dialogue:5000"));
        assert!(playback.autoplay);
    }
}
