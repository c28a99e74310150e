use serde::{Deserialize, Serialize};

/// Body of `POST /process`
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessRequest {
    pub text: String,
}

/// Reply from `POST /process`
#[derive(Debug, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub response: String,
    /// Relative or absolute URI of the synthesized reply, null when TTS failed
    #[serde(rename = "audioUrl", default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}
