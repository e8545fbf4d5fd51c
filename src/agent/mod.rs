//! Agents that turn user intent into document edits.
//!
//! ```text
//!                 ┌────────────── CodeEditorAgent ──────────────┐
//! AgentRequest ──▶│ stt? ─▶ prompt ─▶ llm ─▶ compute_changes ─▶ tts? │──▶ AgentResult
//!                 └─────────────────────────────────────────────┘
//!
//! keystrokes ──▶ InlineSuggestionAgent (debounce + generation) ──▶ Option<InlineSuggestionResult>
//! ```

pub mod inline;
pub mod orchestrator;
pub mod types;

pub use inline::InlineSuggestionAgent;
pub use orchestrator::{AgentError, CodeEditorAgent};
pub use types::{
    split_lines, AgentRequest, AgentResult, DocumentSnapshot, InlineSuggestionResult, Instruction,
};
