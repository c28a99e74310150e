use super::client::{DialogueBackend, Reply};
use super::messages::{ProcessRequest, ProcessResponse};
use crate::error::BackendError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

/// Where the dialogue backend lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL, also used to resolve relative reply audio (e.g. "http://127.0.0.1:5000")
    pub base_url: String,

    /// Path of the processing endpoint
    pub process_path: String,

    /// Bounded wait for one reply; none waits indefinitely
    pub request_timeout_ms: Option<u64>,
}

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            process_path: "/process".to_string(),
            request_timeout_ms: Some(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    /// Full URL of the processing endpoint
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.process_path.starts_with('/') {
            format!("{}{}", base, self.process_path)
        } else {
            format!("{}/{}", base, self.process_path)
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self::new("http://127.0.0.1:5000")
    }
}

/// Dialogue backend reached over HTTP: JSON `{"text"}` in, `{"response", "audioUrl"}` out
pub struct HttpBackend {
    client: reqwest::Client,
    endpoint: String,
    timeout_ms: Option<u64>,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(ms) = config.request_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        let endpoint = config.endpoint();

        info!("Dialogue backend endpoint: {}", endpoint);

        Ok(Self {
            client,
            endpoint,
            timeout_ms: config.request_timeout_ms,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, e: reqwest::Error) -> BackendError {
        match self.timeout_ms {
            Some(ms) if e.is_timeout() => BackendError::Timeout(ms),
            _ => BackendError::Transport(e.to_string()),
        }
    }
}

#[async_trait::async_trait]
impl DialogueBackend for HttpBackend {
    async fn send(&self, text: &str) -> Result<Reply, BackendError> {
        debug!("POST {} ({} chars)", self.endpoint, text.len());

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ProcessRequest {
                text: text.to_string(),
            })
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        let message: ProcessResponse = serde_json::from_slice(&body)
            .map_err(|e| BackendError::BadResponse(e.to_string()))?;

        Ok(Reply::new(message.response, message.audio_url))
    }

    fn name(&self) -> &str {
        "http"
    }
}
