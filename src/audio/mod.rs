//! Audio packaging: VAD segment (`f32` samples) → WAV bytes for the
//! transcription endpoint.
//!
//! Capture and voice-activity detection live outside this crate.

pub mod wav;

pub use wav::{duration_secs, encode_wav};
