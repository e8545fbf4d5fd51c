//! Speech-synthesis capability used to read explanations aloud.
//!
//! Playback is the caller's job; this module only produces audio bytes.

pub mod synthesizer;

pub use synthesizer::{ApiSynthesizer, TextToSpeech};

#[cfg(test)]
pub use synthesizer::MockSynthesizer;
