//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files.  Every section is
//! `#[serde(default)]`, so a settings file only needs the keys it changes.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

/// Speech-to-text backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SttProvider {
    /// Any OpenAI-compatible `/v1/audio/transcriptions` endpoint.
    #[default]
    OpenAiCompatible,
    /// No transcription; audio instructions are rejected.
    Disabled,
}

/// Language-model backend.
///
/// Both variants speak the OpenAI chat-completions wire format; they differ
/// only in their default endpoint and whether a key is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LlmProvider {
    /// OpenAI, Groq, Together.ai, LM Studio, vLLM …
    #[default]
    OpenAiCompatible,
    /// Ollama running locally, no authentication.
    Ollama,
}

/// Text-to-speech backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TtsProvider {
    /// Any OpenAI-compatible `/v1/audio/speech` endpoint.
    #[default]
    OpenAiCompatible,
    /// No spoken explanation; results are text-only.
    Disabled,
}

// ---------------------------------------------------------------------------
// SttConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-to-text capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SttConfig {
    pub provider: SttProvider,
    /// Base URL of the API endpoint (no trailing `/v1`).
    pub base_url: String,
    /// API key, `None` for local providers.
    pub api_key: Option<String>,
    /// Model identifier (e.g. `"whisper-1"`).
    pub model: String,
    /// ISO-639-1 hint; `None` lets the provider detect the language.
    pub language: Option<String>,
    /// Maximum seconds to wait for a transcription.
    pub timeout_secs: u64,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            provider: SttProvider::default(),
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "whisper-1".into(),
            language: None,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmConfig
// ---------------------------------------------------------------------------

/// Settings for the completion capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    /// Base URL of the API endpoint.
    ///
    /// - OpenAI: `https://api.openai.com`
    /// - Ollama: `http://localhost:11434`
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model identifier sent to the API (e.g. `"gpt-4o-mini"`).
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum seconds to wait for a completion.
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: 0.85,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// TtsConfig
// ---------------------------------------------------------------------------

/// Settings for the speech-synthesis capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TtsConfig {
    pub provider: TtsProvider,
    pub base_url: String,
    pub api_key: Option<String>,
    /// Model identifier (e.g. `"tts-1"`).
    pub model: String,
    /// Voice name passed to the provider.
    pub voice: String,
    /// Audio container requested from the provider (`"mp3"`, `"wav"`, …).
    pub format: String,
    pub timeout_secs: u64,
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            provider: TtsProvider::default(),
            base_url: "https://api.openai.com".into(),
            api_key: None,
            model: "tts-1".into(),
            voice: "alloy".into(),
            format: "mp3".into(),
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// InlineConfig
// ---------------------------------------------------------------------------

/// Settings for as-you-type inline suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InlineConfig {
    pub enabled: bool,
    /// Quiet period after the last keystroke before a suggestion is requested.
    pub debounce_ms: u64,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 1_000,
        }
    }
}

// ---------------------------------------------------------------------------
// CaptureConfig
// ---------------------------------------------------------------------------

/// Settings for packaging voice-activity segments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Sample rate of the `f32` segments delivered by the VAD.
    pub sample_rate: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use voice_code_editor::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stt: SttConfig,
    pub llm: LlmConfig,
    pub tts: TtsConfig,
    pub inline: InlineConfig,
    pub capture: CaptureConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.stt.provider, loaded.stt.provider);
        assert_eq!(original.stt.model, loaded.stt.model);
        assert_eq!(original.llm.base_url, loaded.llm.base_url);
        assert_eq!(original.llm.model, loaded.llm.model);
        assert_eq!(original.llm.temperature, loaded.llm.temperature);
        assert_eq!(original.tts.voice, loaded.tts.voice);
        assert_eq!(original.inline.debounce_ms, loaded.inline.debounce_ms);
        assert_eq!(original.capture.sample_rate, loaded.capture.sample_rate);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        assert_eq!(config.llm.model, LlmConfig::default().model);
        assert_eq!(config.tts.provider, TtsProvider::OpenAiCompatible);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.llm.provider, LlmProvider::OpenAiCompatible);
        assert!((cfg.llm.temperature - 0.85).abs() < f32::EPSILON);
        assert!(cfg.llm.api_key.is_none());
        assert_eq!(cfg.stt.model, "whisper-1");
        assert_eq!(cfg.tts.voice, "alloy");
        assert_eq!(cfg.inline.debounce_ms, 1_000);
        assert_eq!(cfg.capture.sample_rate, 16_000);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("partial.toml");
        std::fs::write(
            &path,
            "[llm]\nprovider = \"Ollama\"\nbase_url = \"http://localhost:11434\"\nmodel = \"qwen2.5-coder:7b\"\n\n[tts]\nprovider = \"Disabled\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load_from(&path).expect("load");
        assert_eq!(cfg.llm.provider, LlmProvider::Ollama);
        assert_eq!(cfg.llm.model, "qwen2.5-coder:7b");
        assert_eq!(cfg.llm.timeout_secs, LlmConfig::default().timeout_secs);
        assert_eq!(cfg.tts.provider, TtsProvider::Disabled);
        assert_eq!(cfg.stt.model, "whisper-1");
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.stt.provider = SttProvider::Disabled;
        cfg.stt.language = Some("en".into());
        cfg.llm.api_key = Some("sk-test".into());
        cfg.llm.timeout_secs = 5;
        cfg.tts.format = "wav".into();
        cfg.inline.enabled = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.stt.provider, SttProvider::Disabled);
        assert_eq!(loaded.stt.language.as_deref(), Some("en"));
        assert_eq!(loaded.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(loaded.llm.timeout_secs, 5);
        assert_eq!(loaded.tts.format, "wav");
        assert!(!loaded.inline.enabled);
    }
}
