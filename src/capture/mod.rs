//! Voice capture cycle: VAD events → one agent request at a time.
//!
//! # Architecture
//!
//! ```text
//! VoiceEvent (mpsc) ──▶ CaptureRunner::run()  ← async tokio task
//!                          │
//!                          ├─ CaptureState::on(event) → Transition { next, effect }
//!                          ├─ watch::Sender<CaptureState>   ──▶ UI (read-only)
//!                          └─ mpsc::Sender<CaptureOutput>   ──▶ UI (edits, audio, errors)
//! ```

pub mod runner;
pub mod state;

pub use runner::{CaptureError, CaptureOutput, CaptureRunner, VoiceEvent};
pub use state::{CaptureEvent, CaptureState, Effect, Presentation, Transition};
