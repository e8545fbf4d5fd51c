//! Request and result types exchanged with the agents.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::diff::LineChange;
use crate::selection::SelectionInformation;

// ---------------------------------------------------------------------------
// DocumentSnapshot
// ---------------------------------------------------------------------------

/// Immutable copy of the document taken when a request is created.
///
/// The diff for a request is always computed against this snapshot, never
/// against the live document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub lines: Vec<String>,
    pub path: PathBuf,
}

impl DocumentSnapshot {
    pub fn new(path: impl Into<PathBuf>, lines: Vec<String>) -> Self {
        Self {
            lines,
            path: path.into(),
        }
    }

    /// Split `text` into lines the same way [`crate::diff::TextDocument`] does.
    pub fn from_text(path: impl Into<PathBuf>, text: &str) -> Self {
        Self::new(path, split_lines(text))
    }
}

/// Line contents of `text`, breaks removed.  A trailing break does not open
/// a new line; `\r\n` counts as one break.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}

// ---------------------------------------------------------------------------
// Instruction / AgentRequest
// ---------------------------------------------------------------------------

/// What the user asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Typed instruction.
    Text(String),
    /// Spoken instruction as a complete audio file (WAV).
    Audio(Vec<u8>),
}

impl Instruction {
    pub fn is_audio(&self) -> bool {
        matches!(self, Instruction::Audio(_))
    }
}

/// One unit of work for [`super::CodeEditorAgent::generate_completion`].
#[derive(Debug, Clone)]
pub struct AgentRequest {
    pub snapshot: DocumentSnapshot,
    pub selections: Vec<SelectionInformation>,
    pub instruction: Instruction,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Composite result of one edit request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResult {
    /// Full proposed document body.
    pub code_completion: String,
    pub explanation: String,
    /// Line edits from the snapshot to `code_completion`.
    pub changes: Vec<LineChange>,
    /// Spoken explanation; `None` when synthesis is off or failed.
    pub audio: Option<Vec<u8>>,
}

impl AgentResult {
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

/// Candidate insertions at the cursor, best first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineSuggestionResult {
    #[serde(default)]
    pub snippets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_matches_document_model() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\n\nb"), vec!["a", "", "b"]);
    }

    #[test]
    fn snapshot_from_text() {
        let snap = DocumentSnapshot::from_text("x.rs", "fn a() {}\n");
        assert_eq!(snap.lines, vec!["fn a() {}"]);
        assert_eq!(snap.path, PathBuf::from("x.rs"));
    }

    #[test]
    fn inline_result_tolerates_missing_snippets() {
        let r: InlineSuggestionResult = serde_json::from_str("{}").unwrap();
        assert!(r.snippets.is_empty());
    }
}
