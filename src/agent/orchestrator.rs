//! `CodeEditorAgent`: instruction in, line edits (and spoken explanation) out.
//!
//! # Request flow
//!
//! ```text
//! AgentRequest
//!   ├─ Instruction::Audio ──▶ SpeechToText::transcribe    (fail → abort)
//!   ├─ PromptBuilder::build_edit(snapshot, selections, instruction)
//!   ├─ LanguageModel::complete                             (fail → abort)
//!   ├─ compute_changes(snapshot.lines, proposed lines)
//!   └─ TextToSpeech::synthesize(explanation)               (fail → audio: None)
//! ```
//!
//! The three capability calls run strictly one after another.  No call is
//! retried.

use std::sync::Arc;

use thiserror::Error;

use crate::config::{AppConfig, SttProvider, TtsProvider};
use crate::diff::compute_changes;
use crate::error::ProviderError;
use crate::llm::{ApiLanguageModel, LanguageModel, PromptBuilder};
use crate::stt::{ApiTranscriber, SpeechToText};
use crate::tts::{ApiSynthesizer, TextToSpeech};

use super::types::{split_lines, AgentRequest, AgentResult, Instruction};

// ---------------------------------------------------------------------------
// AgentError
// ---------------------------------------------------------------------------

/// Reasons a request produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    /// The spoken instruction could not be transcribed.
    #[error("transcription failed: {0}")]
    Transcription(#[source] ProviderError),

    /// The language model call failed or its reply was unusable.
    #[error("completion failed: {0}")]
    Completion(#[source] ProviderError),

    /// An audio instruction arrived but speech-to-text is disabled.
    #[error("audio instruction received but no speech-to-text provider is configured")]
    NoTranscriber,

    /// The instruction was empty (or transcribed to nothing).
    #[error("instruction is empty")]
    EmptyInstruction,
}

// ---------------------------------------------------------------------------
// CodeEditorAgent
// ---------------------------------------------------------------------------

/// Orchestrates one edit request across the three capabilities.
///
/// ```rust,no_run
/// use std::path::PathBuf;
/// use voice_code_editor::agent::{AgentRequest, CodeEditorAgent, DocumentSnapshot, Instruction};
/// use voice_code_editor::config::AppConfig;
///
/// # async fn example() {
/// let agent = CodeEditorAgent::from_config(&AppConfig::default());
/// let request = AgentRequest {
///     snapshot: DocumentSnapshot::new("main.rs", vec!["fn main() {}".into()]),
///     selections: Vec::new(),
///     instruction: Instruction::Text("print hello".into()),
/// };
/// let result = agent.generate_completion(request).await.unwrap();
/// for change in &result.changes {
///     println!("{change}");
/// }
/// # }
/// ```
pub struct CodeEditorAgent {
    stt: Option<Arc<dyn SpeechToText>>,
    llm: Arc<dyn LanguageModel>,
    tts: Option<Arc<dyn TextToSpeech>>,
    prompt_builder: PromptBuilder,
    temperature: f32,
    voice: Option<String>,
}

impl CodeEditorAgent {
    /// Agent with only a language model: text instructions, no speech.
    pub fn new(llm: Arc<dyn LanguageModel>, temperature: f32) -> Self {
        Self {
            stt: None,
            llm,
            tts: None,
            prompt_builder: PromptBuilder::new(),
            temperature,
            voice: None,
        }
    }

    pub fn with_transcriber(mut self, stt: Arc<dyn SpeechToText>) -> Self {
        self.stt = Some(stt);
        self
    }

    /// Enable spoken explanations.  `voice: None` uses the synthesizer's
    /// default voice.
    pub fn with_synthesizer(mut self, tts: Arc<dyn TextToSpeech>, voice: Option<String>) -> Self {
        self.tts = Some(tts);
        self.voice = voice;
        self
    }

    /// Select providers from configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let llm: Arc<dyn LanguageModel> = Arc::new(ApiLanguageModel::from_config(&config.llm));
        let mut agent = Self::new(llm, config.llm.temperature);

        match config.stt.provider {
            SttProvider::OpenAiCompatible => {
                agent = agent.with_transcriber(Arc::new(ApiTranscriber::from_config(&config.stt)));
            }
            SttProvider::Disabled => log::info!("agent: speech-to-text disabled"),
        }
        match config.tts.provider {
            TtsProvider::OpenAiCompatible => {
                let voice = Some(config.tts.voice.clone());
                agent =
                    agent.with_synthesizer(Arc::new(ApiSynthesizer::from_config(&config.tts)), voice);
            }
            TtsProvider::Disabled => log::info!("agent: speech synthesis disabled"),
        }
        agent
    }

    pub fn accepts_audio(&self) -> bool {
        self.stt.is_some()
    }

    /// Run one request to completion.
    pub async fn generate_completion(&self, request: AgentRequest) -> Result<AgentResult, AgentError> {
        let AgentRequest {
            snapshot,
            selections,
            instruction,
        } = request;

        // ── 1. Instruction text ──────────────────────────────────────────
        let instruction = match instruction {
            Instruction::Text(text) => text,
            Instruction::Audio(audio) => {
                let stt = self.stt.as_ref().ok_or(AgentError::NoTranscriber)?;
                let text = stt
                    .transcribe(&audio)
                    .await
                    .map_err(AgentError::Transcription)?;
                log::debug!("agent: transcribed instruction = {:?}", text);
                text
            }
        };
        if instruction.trim().is_empty() {
            return Err(AgentError::EmptyInstruction);
        }

        // ── 2. Prompt ────────────────────────────────────────────────────
        let prompt = self.prompt_builder.build_edit(
            &snapshot.path,
            &snapshot.lines,
            &selections,
            &instruction,
        );

        // ── 3. Completion ────────────────────────────────────────────────
        let completion = self
            .llm
            .complete(&prompt, self.temperature)
            .await
            .map_err(AgentError::Completion)?;

        // ── 4. Diff against the snapshot ─────────────────────────────────
        let proposed = split_lines(&completion.code_completion);
        let changes = compute_changes(&snapshot.lines, &proposed);
        log::debug!(
            "agent: {} line change(s) for {}",
            changes.len(),
            snapshot.path.display()
        );

        // ── 5. Spoken explanation ────────────────────────────────────────
        let audio = self.speak(&completion.explanation).await;

        Ok(AgentResult {
            code_completion: completion.code_completion,
            explanation: completion.explanation,
            changes,
            audio,
        })
    }

    async fn speak(&self, explanation: &str) -> Option<Vec<u8>> {
        let tts = self.tts.as_ref()?;
        if explanation.trim().is_empty() {
            return None;
        }
        let voice = self.voice.as_deref().unwrap_or_else(|| tts.default_voice());
        match tts.synthesize(explanation, voice).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                log::warn!("agent: speech synthesis failed ({e}), returning text only");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
