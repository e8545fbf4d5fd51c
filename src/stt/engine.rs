//! Speech-to-text capability trait and the HTTP transcriber.
//!
//! [`SpeechToText`] is the interface the agent uses to turn a spoken
//! instruction into text.  It is object-safe and `Send + Sync` so it can be
//! held behind an `Arc<dyn SpeechToText>`.
//!
//! [`ApiTranscriber`] posts a WAV file to any OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::config::SttConfig;
use crate::error::{check_status, with_api_key, ProviderError};

// ---------------------------------------------------------------------------
// SpeechToText trait
// ---------------------------------------------------------------------------

/// Turns recorded speech into text.
///
/// # Contract
///
/// - `audio` is a complete audio file (WAV from [`crate::audio::encode_wav`]).
/// - The returned text is trimmed; it may be empty when nothing was said.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, ProviderError>;
}

// Compile-time assertion: Box<dyn SpeechToText> must be constructible.
const _: fn() = || {
    fn _assert_object_safe(_: Box<dyn SpeechToText>) {}
};

// ---------------------------------------------------------------------------
// ApiTranscriber
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible transcription endpoint.
///
/// Works with OpenAI, Groq, and local servers such as `faster-whisper-server`.
/// All connection details come from [`SttConfig`].
pub struct ApiTranscriber {
    client: reqwest::Client,
    config: SttConfig,
}

impl std::fmt::Debug for ApiTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiTranscriber")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ApiTranscriber {
    /// Build a transcriber with the per-request timeout from
    /// `config.timeout_secs`.
    pub fn from_config(config: &SttConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl SpeechToText for ApiTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, ProviderError> {
        let file = Part::bytes(audio.to_vec())
            .file_name("instruction.wav")
            .mime_str("audio/wav")?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("response_format", "json");
        if let Some(lang) = self.config.language.as_deref().filter(|l| !l.is_empty()) {
            form = form.text("language", lang.to_string());
        }

        log::debug!(
            "stt: posting {} byte(s) to {} (model={})",
            audio.len(),
            self.endpoint(),
            self.config.model
        );

        let req = self.client.post(self.endpoint()).multipart(form);
        let response = with_api_key(req, self.config.api_key.as_deref()).send().await?;
        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = json["text"]
            .as_str()
            .ok_or_else(|| ProviderError::Parse("missing `text` field".into()))?
            .trim()
            .to_string();

        log::debug!("stt: transcript = {:?}", text);
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// MockTranscriber (test only)
// ---------------------------------------------------------------------------

/// Returns a pre-configured transcript or error without touching the network.
#[cfg(test)]
pub struct MockTranscriber {
    response: Result<String, ProviderError>,
}

#[cfg(test)]
impl MockTranscriber {
    pub fn ok(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
        }
    }

    pub fn err(error: ProviderError) -> Self {
        Self {
            response: Err(error),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl SpeechToText for MockTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, ProviderError> {
        self.response.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
