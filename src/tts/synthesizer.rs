//! `TextToSpeech` trait and the HTTP synthesizer.

use async_trait::async_trait;

use crate::config::TtsConfig;
use crate::error::{check_status, with_api_key, ProviderError};

/// Speaks a short text.
///
/// Returns the encoded audio file (container chosen by the implementation).
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError>;

    /// Voice used when the caller has no preference.
    fn default_voice(&self) -> &str {
        "alloy"
    }
}

/// Calls an OpenAI-compatible `/v1/audio/speech` endpoint.
pub struct ApiSynthesizer {
    client: reqwest::Client,
    config: TtsConfig,
}

impl std::fmt::Debug for ApiSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiSynthesizer")
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .field("voice", &self.config.voice)
            .finish_non_exhaustive()
    }
}

impl ApiSynthesizer {
    pub fn from_config(config: &TtsConfig) -> Self {
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
        format!("{}/v1/audio/speech", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TextToSpeech for ApiSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, ProviderError> {
        let body = serde_json::json!({
            "model":           self.config.model,
            "input":           text,
            "voice":           voice,
            "response_format": self.config.format
        });

        log::debug!(
            "tts: POST {} (voice={voice}, {} char(s))",
            self.endpoint(),
            text.chars().count()
        );

        let req = self.client.post(self.endpoint()).json(&body);
        let response = with_api_key(req, self.config.api_key.as_deref()).send().await?;
        let bytes = check_status(response).await?.bytes().await?;

        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(bytes.to_vec())
    }

    fn default_voice(&self) -> &str {
        &self.config.voice
    }
}

/// Returns fixed bytes or a fixed error.
#[cfg(test)]
pub struct MockSynthesizer {
    response: Result<Vec<u8>, ProviderError>,
}

#[cfg(test)]
impl MockSynthesizer {
    pub fn ok(bytes: &[u8]) -> Self {
        Self {
            response: Ok(bytes.to_vec()),
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
impl TextToSpeech for MockSynthesizer {
    async fn synthesize(&self, _text: &str, _voice: &str) -> Result<Vec<u8>, ProviderError> {
        self.response.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_voice_comes_from_config() {
        let config = TtsConfig {
            voice: "nova".into(),
            base_url: "http://tts.local/".into(),
            ..TtsConfig::default()
        };
        let tts = ApiSynthesizer::from_config(&config);
        assert_eq!(tts.default_voice(), "nova");
        assert_eq!(tts.endpoint(), "http://tts.local/v1/audio/speech");
    }

    #[test]
    fn synthesizer_is_object_safe() {
        let tts: Box<dyn TextToSpeech> = Box::new(ApiSynthesizer::from_config(&TtsConfig::default()));
        drop(tts);
    }
}
