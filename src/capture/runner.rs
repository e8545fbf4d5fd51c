//! Capture runner, the single owner of [`CaptureState`].
//!
//! [`CaptureRunner`] consumes [`VoiceEvent`]s from the VAD over a
//! `tokio::sync::mpsc` channel, feeds them through [`CaptureState::on`] and
//! performs the resulting effects.
//!
//! # Flow
//!
//! ```text
//! VoiceEvent::SpeechStart
//!   └─▶ Listening
//!
//! VoiceEvent::SpeechEnd { samples }
//!   └─▶ encode_wav → snapshot + selections from SharedSession
//!         └─▶ tokio::spawn(agent.generate_completion)        [Processing]
//!               ├─ Ok  → session.apply_changes → Applied      [Idle]
//!               │                           └─ + Playback      [Speaking]
//!               └─ Err → Failed                                [Idle]
//!
//! VoiceEvent::PlaybackEnd   (sent by whoever plays the audio)
//!   └─▶ Idle
//! ```
//!
//! The agent runs on its own task so the event loop keeps draining the
//! channel; speech arriving while `Processing` or `Speaking` is dropped.

use std::sync::{Arc, PoisonError};

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};

use crate::agent::{AgentError, AgentRequest, AgentResult, CodeEditorAgent, Instruction};
use crate::audio::{duration_secs, encode_wav};
use crate::diff::{ApplyReport, DocumentError};
use crate::session::SharedSession;

use super::state::{CaptureEvent, CaptureState, Effect};

type Pending = JoinHandle<Result<AgentResult, AgentError>>;

// ---------------------------------------------------------------------------
// Events / outputs
// ---------------------------------------------------------------------------

/// Input from the voice-activity detector (and the audio player).
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    SpeechStart,
    /// A finished speech segment as mono `f32` samples.
    SpeechEnd { samples: Vec<f32> },
    /// Playback of the last explanation finished.
    PlaybackEnd,
}

/// Why a capture cycle produced no edit.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("could not apply changes: {0}")]
    Document(#[from] DocumentError),

    /// The agent task panicked or was cancelled.
    #[error("agent task failed: {0}")]
    Internal(String),
}

/// What the runner reports to the UI.
#[derive(Debug)]
pub enum CaptureOutput {
    /// Changes were applied to the session.  `result.audio` has been moved
    /// into a following [`CaptureOutput::Playback`] when present.
    Applied {
        result: AgentResult,
        report: ApplyReport,
    },
    /// Audio to play now; send [`VoiceEvent::PlaybackEnd`] when done.
    Playback(Vec<u8>),
    Failed(CaptureError),
}

// ---------------------------------------------------------------------------
// CaptureRunner
// ---------------------------------------------------------------------------

/// Drives the capture cycle.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio::sync::mpsc;
/// use voice_code_editor::agent::CodeEditorAgent;
/// use voice_code_editor::capture::{CaptureRunner, VoiceEvent};
/// use voice_code_editor::config::AppConfig;
/// use voice_code_editor::session::{new_shared_session, EditorSession};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = AppConfig::load()?;
/// let session = new_shared_session(EditorSession::open("src/main.rs")?);
/// let agent = Arc::new(CodeEditorAgent::from_config(&config));
///
/// let (out_tx, mut out_rx) = mpsc::channel(8);
/// let (vad_tx, vad_rx) = mpsc::channel::<VoiceEvent>(16);
/// let runner = CaptureRunner::new(agent, session, config.capture.sample_rate, out_tx);
/// let state = runner.subscribe();
///
/// tokio::spawn(runner.run(vad_rx));
/// // vad_tx is handed to the voice-activity detector.
/// # drop((vad_tx, state, out_rx.recv().await));
/// # Ok(())
/// # }
/// ```
pub struct CaptureRunner {
    agent: Arc<CodeEditorAgent>,
    session: SharedSession,
    sample_rate: u32,
    state: CaptureState,
    state_tx: watch::Sender<CaptureState>,
    output_tx: mpsc::Sender<CaptureOutput>,
}

impl CaptureRunner {
    pub fn new(
        agent: Arc<CodeEditorAgent>,
        session: SharedSession,
        sample_rate: u32,
        output_tx: mpsc::Sender<CaptureOutput>,
    ) -> Self {
        let (state_tx, _) = watch::channel(CaptureState::Idle);
        Self {
            agent,
            session,
            sample_rate,
            state: CaptureState::Idle,
            state_tx,
            output_tx,
        }
    }

    /// Read-only view of the current state.
    pub fn subscribe(&self) -> watch::Receiver<CaptureState> {
        self.state_tx.subscribe()
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `events` is closed and no request is in flight.
    pub async fn run(mut self, mut events: mpsc::Receiver<VoiceEvent>) {
        let mut pending: Option<Pending> = None;
        let mut events_open = true;

        loop {
            tokio::select! {
                event = events.recv(), if events_open => match event {
                    Some(event) => {
                        if let Some(handle) = self.handle_voice(event) {
                            pending = Some(handle);
                        }
                    }
                    None => events_open = false,
                },
                outcome = join_pending(&mut pending), if pending.is_some() => {
                    pending = None;
                    self.handle_outcome(outcome).await;
                }
            }

            if !events_open && pending.is_none() {
                break;
            }
        }

        log::info!("capture: event channel closed, runner shutting down");
    }

    // -----------------------------------------------------------------------
    // Event handlers
    // -----------------------------------------------------------------------

    fn handle_voice(&mut self, event: VoiceEvent) -> Option<Pending> {
        let (input, samples) = match event {
            VoiceEvent::SpeechStart => (CaptureEvent::SpeechStart, None),
            VoiceEvent::SpeechEnd { samples } => (CaptureEvent::SpeechEnd, Some(samples)),
            VoiceEvent::PlaybackEnd => (CaptureEvent::PlaybackEnd, None),
        };

        match self.transition(input) {
            Effect::SubmitRequest => Some(self.submit(samples.unwrap_or_default())),
            _ => None,
        }
    }

    fn submit(&self, samples: Vec<f32>) -> Pending {
        log::debug!(
            "capture: submitting {:.2}s of speech",
            duration_secs(samples.len(), self.sample_rate)
        );
        let audio = encode_wav(&samples, self.sample_rate);

        let request = {
            let session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            AgentRequest {
                snapshot: session.snapshot(),
                selections: session.selections(),
                instruction: Instruction::Audio(audio),
            }
        };

        let agent = Arc::clone(&self.agent);
        tokio::spawn(async move { agent.generate_completion(request).await })
    }

    async fn handle_outcome(&mut self, outcome: Result<Result<AgentResult, AgentError>, JoinError>) {
        let mut result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => return self.fail(e.into()).await,
            Err(e) => return self.fail(CaptureError::Internal(e.to_string())).await,
        };

        let applied = {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
            session.apply_changes(&result.changes)
        };
        let report = match applied {
            Ok(report) => report,
            Err(e) => return self.fail(e.into()).await,
        };

        let audio = result.audio.take();
        let play = match self.transition(CaptureEvent::AgentResolved {
            has_audio: audio.is_some(),
        }) {
            Effect::ApplyResult { play } => play,
            _ => false,
        };

        log::info!(
            "capture: applied {} edit(s), {} stale",
            report.applied,
            report.stale.len()
        );
        let _ = self.output_tx.send(CaptureOutput::Applied { result, report }).await;

        if let (true, Some(audio)) = (play, audio) {
            let _ = self.output_tx.send(CaptureOutput::Playback(audio)).await;
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    /// Apply `event` to the state machine and publish the new state.
    fn transition(&mut self, event: CaptureEvent) -> Effect {
        let t = self.state.on(event);
        if t.effect == Effect::Ignored {
            log::debug!("capture: {event:?} ignored in {:?}", self.state);
            return t.effect;
        }
        log::debug!("capture: {:?} --{event:?}--> {:?}", self.state, t.next);
        self.state = t.next;
        self.state_tx.send_replace(t.next);
        t.effect
    }

    async fn fail(&mut self, error: CaptureError) {
        log::error!("capture: request failed: {error}");
        self.transition(CaptureEvent::AgentFailed);
        let _ = self.output_tx.send(CaptureOutput::Failed(error)).await;
    }
}

async fn join_pending(
    pending: &mut Option<Pending>,
) -> Result<Result<AgentResult, AgentError>, JoinError> {
    match pending {
        Some(handle) => handle.await,
        None => std::future::pending().await,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
