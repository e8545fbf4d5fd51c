//! Language-model capability.
//!
//! This module provides:
//! * [`LanguageModel`]: async trait implemented by all completion backends.
//! * [`ApiLanguageModel`]: OpenAI-compatible REST backend (also Ollama).
//! * [`PromptBuilder`]: builds edit and inline-suggestion prompts.
//! * [`CodeCompletion`]: the parsed `{"codeCompletion", "explanation"}` reply.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use voice_code_editor::config::AppConfig;
//! use voice_code_editor::llm::{ApiLanguageModel, LanguageModel, PromptBuilder};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let model = ApiLanguageModel::from_config(&config.llm);
//!
//!     let lines = vec!["print('hi')".to_string()];
//!     let prompt = PromptBuilder::new().build_edit(Path::new("hi.py"), &lines, &[], "say hello");
//!     let completion = model.complete(&prompt, config.llm.temperature).await.unwrap();
//!     println!("{}", completion.explanation);
//! }
//! ```

pub mod model;
pub mod prompt;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use model::{parse_json_reply, ApiLanguageModel, ChatPrompt, CodeCompletion, LanguageModel};
pub use prompt::{PromptBuilder, CURSOR_MARKER};

#[cfg(test)]
pub use model::MockLanguageModel;
