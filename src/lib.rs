//! Voice, text and pen driven code editing.
//!
//! An AI service proposes a complete new document body; this crate turns it
//! into line-level edits and applies them to the live document in one batch.
//!
//! ```text
//! VAD ──VoiceEvent──▶ capture::CaptureRunner ──AgentRequest──▶ agent::CodeEditorAgent
//!                          │                                    ├─ stt::SpeechToText
//!                          │                                    ├─ llm::LanguageModel
//!                          │                                    └─ tts::TextToSpeech
//!                          ▼
//!                  session::EditorSession ◀── diff::apply_changes(AgentResult.changes)
//!                          ▲
//! pen strokes ──selection::SelectionSession
//! ```

pub mod agent;
pub mod audio;
pub mod capture;
pub mod config;
pub mod diff;
pub mod error;
pub mod llm;
pub mod selection;
pub mod session;
pub mod stt;
pub mod tts;

pub use error::ProviderError;
