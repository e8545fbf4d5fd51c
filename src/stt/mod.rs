//! Speech-to-text capability.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │           SpeechToText (trait)               │
//! │                                              │
//! │   WAV bytes ──▶ ApiTranscriber ──▶ text      │
//! │                 POST /v1/audio/transcriptions│
//! └──────────────────────────────────────────────┘
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_code_editor::config::SttConfig;
//! use voice_code_editor::stt::{ApiTranscriber, SpeechToText};
//!
//! # async fn example(wav: Vec<u8>) {
//! let stt = ApiTranscriber::from_config(&SttConfig::default());
//! let text = stt.transcribe(&wav).await.unwrap();
//! println!("{text}");
//! # }
//! ```

pub mod engine;

// ── Public re-exports ──────────────────────────────────────────────────────

pub use engine::{ApiTranscriber, SpeechToText};

// test-only re-export so the agent tests can import MockTranscriber
// without `use crate::stt::engine::MockTranscriber`.
#[cfg(test)]
pub use engine::MockTranscriber;
