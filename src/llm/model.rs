//! Core `LanguageModel` trait and `ApiLanguageModel` implementation.
//!
//! `ApiLanguageModel` calls any OpenAI-compatible `/v1/chat/completions`
//! endpoint: Ollama (OpenAI mode), OpenAI, Groq, LM Studio, vLLM, etc.
//! All connection details come from [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{LlmConfig, LlmProvider};
use crate::error::{check_status, with_api_key, ProviderError};

// ---------------------------------------------------------------------------
// ChatPrompt / CodeCompletion
// ---------------------------------------------------------------------------

/// A system + user message pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
}

/// Structured reply to a code-editing prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeCompletion {
    /// Full proposed document body.
    pub code_completion: String,
    /// Human-readable summary of the change.
    #[serde(default)]
    pub explanation: String,
}

// ---------------------------------------------------------------------------
// LanguageModel trait
// ---------------------------------------------------------------------------

/// Async trait for chat-completion backends.
///
/// Implementors must be `Send + Sync` so they can be shared across tasks
/// (e.g. wrapped in `Arc<dyn LanguageModel>`).  Only [`chat`](Self::chat)
/// is required; [`complete`](Self::complete) parses its reply.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send `prompt` and return the assistant message text.
    async fn chat(&self, prompt: &ChatPrompt, temperature: f32) -> Result<String, ProviderError>;

    /// Send `prompt` and parse the reply as a [`CodeCompletion`].
    async fn complete(
        &self,
        prompt: &ChatPrompt,
        temperature: f32,
    ) -> Result<CodeCompletion, ProviderError> {
        let raw = self.chat(prompt, temperature).await?;
        parse_json_reply(&raw)
    }
}

/// Parse a model reply that should be a single JSON object.
///
/// Models often wrap JSON in a markdown fence or add a sentence around it,
/// so the outermost `{ … }` is tried when the whole reply does not parse.
pub fn parse_json_reply<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T, ProviderError> {
    let body = strip_fence(raw.trim());
    if body.is_empty() {
        return Err(ProviderError::EmptyResponse);
    }

    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            let object = match (body.find('{'), body.rfind('}')) {
                (Some(start), Some(end)) if start < end => &body[start..=end],
                _ => return Err(ProviderError::Parse(first.to_string())),
            };
            serde_json::from_str(object).map_err(|e| ProviderError::Parse(e.to_string()))
        }
    }
}

fn strip_fence(s: &str) -> &str {
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    // Drop the info string (`json`, …) on the opening fence line.
    let rest = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => rest,
    };
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

// ---------------------------------------------------------------------------
// ApiLanguageModel
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint and asks for
/// a JSON object reply.
pub struct ApiLanguageModel {
    client: reqwest::Client,
    config: LlmConfig,
}

impl std::fmt::Debug for ApiLanguageModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiLanguageModel")
            .field("provider", &self.config.provider)
            .field("base_url", &self.config.base_url)
            .field("model", &self.config.model)
            .finish_non_exhaustive()
    }
}

impl ApiLanguageModel {
    /// Build an `ApiLanguageModel` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            config: config.clone(),
        }
    }

    /// Sampling temperature from config.
    pub fn temperature(&self) -> f32 {
        self.config.temperature
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn api_key(&self) -> Option<&str> {
        match self.config.provider {
            LlmProvider::Ollama => None,
            LlmProvider::OpenAiCompatible => self.config.api_key.as_deref(),
        }
    }
}

#[async_trait]
impl LanguageModel for ApiLanguageModel {
    async fn chat(&self, prompt: &ChatPrompt, temperature: f32) -> Result<String, ProviderError> {
        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user",   "content": prompt.user   }
            ],
            "stream":          false,
            "temperature":     temperature,
            "response_format": { "type": "json_object" }
        });

        log::debug!(
            "llm: POST {} (model={}, prompt {} char(s))",
            self.endpoint(),
            self.config.model,
            prompt.system.len() + prompt.user.len()
        );

        let req = self.client.post(self.endpoint()).json(&body);
        let response = with_api_key(req, self.api_key()).send().await?;
        let response = check_status(response).await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(ProviderError::EmptyResponse)?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// MockLanguageModel (test only)
// ---------------------------------------------------------------------------

/// Scripted model: fixed reply or error, optional latency, call counting.
#[cfg(test)]
pub struct MockLanguageModel {
    reply: Result<String, ProviderError>,
    delay: Option<std::time::Duration>,
    calls: std::sync::atomic::AtomicUsize,
    last_prompt: std::sync::Mutex<Option<ChatPrompt>>,
}

#[cfg(test)]
impl MockLanguageModel {
    pub fn ok(reply: impl Into<String>) -> Self {
        Self::with_reply(Ok(reply.into()))
    }

    /// Replies with a well-formed `{"codeCompletion", "explanation"}` object.
    pub fn completion(code: &str, explanation: &str) -> Self {
        let json = serde_json::json!({ "codeCompletion": code, "explanation": explanation });
        Self::ok(json.to_string())
    }

    pub fn err(error: ProviderError) -> Self {
        Self::with_reply(Err(error))
    }

    fn with_reply(reply: Result<String, ProviderError>) -> Self {
        Self {
            reply,
            delay: None,
            calls: std::sync::atomic::AtomicUsize::new(0),
            last_prompt: std::sync::Mutex::new(None),
        }
    }

    /// Sleep (on the tokio clock) before replying.
    pub fn with_delay(mut self, delay: std::time::Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<ChatPrompt> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn chat(&self, prompt: &ChatPrompt, _temperature: f32) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config(provider: LlmProvider, api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            provider,
            base_url: "http://localhost:11434".into(),
            api_key: api_key.map(|s| s.to_string()),
            model: "qwen2.5-coder:7b".into(),
            temperature: 0.3,
            timeout_secs: 10,
        }
    }

    /// Replies with a fixed string, for exercising `complete`.
    struct Canned(&'static str);

    #[async_trait]
    impl LanguageModel for Canned {
        async fn chat(&self, _p: &ChatPrompt, _t: f32) -> Result<String, ProviderError> {
            Ok(self.0.to_string())
        }
    }

    fn prompt() -> ChatPrompt {
        ChatPrompt {
            system: "s".into(),
            user: "u".into(),
        }
    }

    #[test]
    fn ollama_never_sends_a_key() {
        let model = ApiLanguageModel::from_config(&make_config(LlmProvider::Ollama, Some("sk-x")));
        assert_eq!(model.api_key(), None);

        let model =
            ApiLanguageModel::from_config(&make_config(LlmProvider::OpenAiCompatible, Some("sk-x")));
        assert_eq!(model.api_key(), Some("sk-x"));
    }

    #[test]
    fn endpoint_is_chat_completions() {
        let model = ApiLanguageModel::from_config(&make_config(LlmProvider::Ollama, None));
        assert_eq!(model.endpoint(), "http://localhost:11434/v1/chat/completions");
        assert!((model.temperature() - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn model_is_object_safe() {
        let model: Box<dyn LanguageModel> = Box::new(ApiLanguageModel::from_config(
            &make_config(LlmProvider::OpenAiCompatible, None),
        ));
        drop(model);
    }

    #[test]
    fn parses_plain_json() {
        let c: CodeCompletion =
            parse_json_reply(r#"{"codeCompletion":"fn a() {}\n","explanation":"added a"}"#)
                .unwrap();
        assert_eq!(c.code_completion, "fn a() {}\n");
        assert_eq!(c.explanation, "added a");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"codeCompletion\": \"x\", \"explanation\": \"y\"}\n```";
        let c: CodeCompletion = parse_json_reply(raw).unwrap();
        assert_eq!(c.code_completion, "x");
        assert_eq!(c.explanation, "y");
    }

    #[test]
    fn parses_json_surrounded_by_prose() {
        let raw = "Sure! Here you go: {\"codeCompletion\": \"x\"} Hope that helps.";
        let c: CodeCompletion = parse_json_reply(raw).unwrap();
        assert_eq!(c.code_completion, "x");
        assert_eq!(c.explanation, "");
    }

    #[test]
    fn rejects_non_json() {
        let err = parse_json_reply::<CodeCompletion>("I cannot do that.").unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }

    #[test]
    fn empty_reply_is_empty_response() {
        let err = parse_json_reply::<CodeCompletion>("  ``` ```  ").unwrap_err();
        assert_eq!(err, ProviderError::EmptyResponse);
    }

    #[tokio::test]
    async fn complete_parses_chat_reply() {
        let model = Canned(r#"{"codeCompletion":"a\nb","explanation":"two lines"}"#);
        let c = model.complete(&prompt(), 0.5).await.unwrap();
        assert_eq!(c.code_completion, "a\nb");
    }

    #[tokio::test]
    async fn complete_reports_missing_field() {
        let model = Canned(r#"{"explanation":"no code"}"#);
        let err = model.complete(&prompt(), 0.5).await.unwrap_err();
        assert!(matches!(err, ProviderError::Parse(_)));
    }
}
