//! Debounced as-you-type suggestions.
//!
//! Every [`InlineSuggestionAgent::suggest`] call takes a generation ticket.
//! A call only reaches the model if no newer call started during its
//! debounce delay, and its reply is only returned if no newer call started
//! while the model was working.  Superseded calls resolve to `Ok(None)`;
//! the in-flight HTTP request is not cancelled, its reply is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;
use crate::llm::{parse_json_reply, ApiLanguageModel, LanguageModel, PromptBuilder};

use super::orchestrator::AgentError;
use super::types::InlineSuggestionResult;

pub struct InlineSuggestionAgent {
    llm: Arc<dyn LanguageModel>,
    prompt_builder: PromptBuilder,
    debounce: Duration,
    temperature: f32,
    generation: AtomicU64,
}

impl InlineSuggestionAgent {
    pub fn new(llm: Arc<dyn LanguageModel>, debounce: Duration, temperature: f32) -> Self {
        Self {
            llm,
            prompt_builder: PromptBuilder::new(),
            debounce,
            temperature,
            generation: AtomicU64::new(0),
        }
    }

    /// `None` when inline suggestions are turned off.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        if !config.inline.enabled {
            return None;
        }
        let llm: Arc<dyn LanguageModel> = Arc::new(ApiLanguageModel::from_config(&config.llm));
        Some(Self::new(
            llm,
            Duration::from_millis(config.inline.debounce_ms),
            config.llm.temperature,
        ))
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Suggest text for the cursor between `prefix` and `suffix`.
    ///
    /// `Ok(None)` means this call was superseded by a newer one (or by
    /// [`cancel`](Self::cancel)).  Errors are only reported for calls that
    /// are still current.
    pub async fn suggest(
        &self,
        prefix: &str,
        suffix: &str,
    ) -> Result<Option<InlineSuggestionResult>, AgentError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        tokio::time::sleep(self.debounce).await;
        if !self.is_current(ticket) {
            log::debug!("inline: request {ticket} superseded during debounce");
            return Ok(None);
        }

        let prompt = self.prompt_builder.build_inline(prefix, suffix);
        let reply = self.llm.chat(&prompt, self.temperature).await;

        if !self.is_current(ticket) {
            log::debug!("inline: discarding stale reply for request {ticket}");
            return Ok(None);
        }

        let raw = reply.map_err(AgentError::Completion)?;
        let mut result: InlineSuggestionResult =
            parse_json_reply(&raw).map_err(AgentError::Completion)?;
        result.snippets.retain(|s| !s.is_empty());

        log::debug!("inline: {} snippet(s)", result.snippets.len());
        Ok(Some(result))
    }

    /// Supersede every pending call (e.g. the cursor moved or the editor
    /// lost focus).
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
