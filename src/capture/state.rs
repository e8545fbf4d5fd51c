//! Capture state machine as a pure transition function.
//!
//! [`CaptureState::on`] is the only place transitions are decided.  The
//! runner owns the single [`CaptureState`] value and performs the returned
//! [`Effect`]; the UI reads a [`Presentation`] projection.

// ---------------------------------------------------------------------------
// CaptureState
// ---------------------------------------------------------------------------

/// States of the voice capture cycle.
///
/// ```text
/// Idle ──SpeechStart──▶ Listening ──SpeechEnd──▶ Processing
///   ▲                                              │
///   ├────────────── AgentResolved (no audio) ──────┤
///   ├────────────── AgentFailed ───────────────────┤
///   │                                              ▼
///   └──────────── PlaybackEnd ──────────────── Speaking   (AgentResolved with audio)
/// ```
///
/// Any other (state, event) pair is ignored, which is what keeps at most
/// one request in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    /// Waiting for the VAD to report speech.
    #[default]
    Idle,
    /// Speech in progress.
    Listening,
    /// One request is with the agent.
    Processing,
    /// The spoken explanation is playing.
    Speaking,
}

/// Inputs to the state machine.  Audio payloads stay with the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    SpeechStart,
    SpeechEnd,
    AgentResolved { has_audio: bool },
    AgentFailed,
    PlaybackEnd,
}

/// What the owner of the state must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Show the "listening" indicator.
    ShowListening,
    /// Package the segment into an `AgentRequest` and submit it.
    SubmitRequest,
    /// Apply the result's changes; start playback when `play` is set.
    ApplyResult { play: bool },
    /// Surface the failure to the user.
    ReportFailure,
    /// Playback finished; nothing left to do.
    Finish,
    /// Event not accepted in this state.
    Ignored,
}

/// Result of [`CaptureState::on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: CaptureState,
    pub effect: Effect,
}

impl CaptureState {
    /// Decide the transition for `event`.
    ///
    /// ```
    /// use voice_code_editor::capture::{CaptureEvent, CaptureState, Effect};
    ///
    /// let t = CaptureState::Processing.on(CaptureEvent::SpeechStart);
    /// assert_eq!(t.next, CaptureState::Processing);
    /// assert_eq!(t.effect, Effect::Ignored);
    /// ```
    pub fn on(self, event: CaptureEvent) -> Transition {
        use CaptureEvent as E;
        use CaptureState as S;

        let (next, effect) = match (self, event) {
            (S::Idle, E::SpeechStart) => (S::Listening, Effect::ShowListening),
            (S::Listening, E::SpeechEnd) => (S::Processing, Effect::SubmitRequest),
            (S::Processing, E::AgentResolved { has_audio: true }) => {
                (S::Speaking, Effect::ApplyResult { play: true })
            }
            (S::Processing, E::AgentResolved { has_audio: false }) => {
                (S::Idle, Effect::ApplyResult { play: false })
            }
            (S::Processing, E::AgentFailed) => (S::Idle, Effect::ReportFailure),
            (S::Speaking, E::PlaybackEnd) => (S::Idle, Effect::Finish),
            (state, _) => (state, Effect::Ignored),
        };
        Transition { next, effect }
    }

    /// `true` while a request is in flight or its answer is playing.
    pub fn is_busy(&self) -> bool {
        matches!(self, CaptureState::Processing | CaptureState::Speaking)
    }

    /// A short human-readable label for a status bar.
    pub fn label(&self) -> &'static str {
        match self {
            CaptureState::Idle => "Idle",
            CaptureState::Listening => "Listening",
            CaptureState::Processing => "Thinking",
            CaptureState::Speaking => "Speaking",
        }
    }

    pub fn presentation(&self) -> Presentation {
        Presentation {
            listening: *self == CaptureState::Listening,
            thinking: *self == CaptureState::Processing,
            speaking: *self == CaptureState::Speaking,
        }
    }
}

// ---------------------------------------------------------------------------
// Presentation
// ---------------------------------------------------------------------------

/// Indicator flags for the UI.  At most one is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Presentation {
    pub listening: bool,
    pub thinking: bool,
    pub speaking: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const STATES: [CaptureState; 4] = [
        CaptureState::Idle,
        CaptureState::Listening,
        CaptureState::Processing,
        CaptureState::Speaking,
    ];

    const EVENTS: [CaptureEvent; 6] = [
        CaptureEvent::SpeechStart,
        CaptureEvent::SpeechEnd,
        CaptureEvent::AgentResolved { has_audio: true },
        CaptureEvent::AgentResolved { has_audio: false },
        CaptureEvent::AgentFailed,
        CaptureEvent::PlaybackEnd,
    ];

    fn go(state: CaptureState, event: CaptureEvent) -> (CaptureState, Effect) {
        let t = state.on(event);
        (t.next, t.effect)
    }

    #[test]
    fn full_cycle_with_audio() {
        let (s, e) = go(CaptureState::Idle, CaptureEvent::SpeechStart);
        assert_eq!((s, e), (CaptureState::Listening, Effect::ShowListening));

        let (s, e) = go(s, CaptureEvent::SpeechEnd);
        assert_eq!((s, e), (CaptureState::Processing, Effect::SubmitRequest));

        let (s, e) = go(s, CaptureEvent::AgentResolved { has_audio: true });
        assert_eq!((s, e), (CaptureState::Speaking, Effect::ApplyResult { play: true }));

        let (s, e) = go(s, CaptureEvent::PlaybackEnd);
        assert_eq!((s, e), (CaptureState::Idle, Effect::Finish));
    }

    #[test]
    fn result_without_audio_returns_to_idle() {
        assert_eq!(
            go(CaptureState::Processing, CaptureEvent::AgentResolved { has_audio: false }),
            (CaptureState::Idle, Effect::ApplyResult { play: false })
        );
    }

    #[test]
    fn failure_returns_to_idle() {
        assert_eq!(
            go(CaptureState::Processing, CaptureEvent::AgentFailed),
            (CaptureState::Idle, Effect::ReportFailure)
        );
    }

    #[test]
    fn speech_is_dropped_while_busy() {
        for state in [CaptureState::Processing, CaptureState::Speaking] {
            for event in [CaptureEvent::SpeechStart, CaptureEvent::SpeechEnd] {
                assert_eq!(go(state, event), (state, Effect::Ignored), "{state:?} {event:?}");
            }
        }
    }

    #[test]
    fn exactly_six_pairs_are_accepted() {
        let accepted = STATES
            .iter()
            .flat_map(|&s| EVENTS.iter().map(move |&e| s.on(e)))
            .filter(|t| t.effect != Effect::Ignored)
            .count();
        assert_eq!(accepted, 6);
    }

    #[test]
    fn ignored_events_never_change_state() {
        for &state in &STATES {
            for &event in &EVENTS {
                let t = state.on(event);
                if t.effect == Effect::Ignored {
                    assert_eq!(t.next, state);
                }
            }
        }
    }

    #[test]
    fn busy_and_labels() {
        assert!(!CaptureState::Idle.is_busy());
        assert!(!CaptureState::Listening.is_busy());
        assert!(CaptureState::Processing.is_busy());
        assert!(CaptureState::Speaking.is_busy());
        assert_eq!(CaptureState::Processing.label(), "Thinking");
        assert_eq!(CaptureState::default(), CaptureState::Idle);
    }

    #[test]
    fn presentation_sets_one_flag() {
        assert_eq!(CaptureState::Idle.presentation(), Presentation::default());
        assert!(CaptureState::Listening.presentation().listening);
        assert!(CaptureState::Processing.presentation().thinking);
        let p = CaptureState::Speaking.presentation();
        assert!(p.speaking && !p.listening && !p.thinking);
    }
}
