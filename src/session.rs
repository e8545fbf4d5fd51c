//! The open document plus the selections drawn on it.
//!
//! [`EditorSession`] is the single mutable resource shared between the UI
//! and the capture runner.  [`SharedSession`] is `Arc<Mutex<EditorSession>>`;
//! lock it for a short critical section and never across an `.await`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::agent::DocumentSnapshot;
use crate::diff::{apply_changes, ApplyReport, DocumentError, LineChange, TextDocument};
use crate::selection::{SelectionInformation, SelectionSession};

// ---------------------------------------------------------------------------
// EditorSession
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    pub document: TextDocument,
    pub path: PathBuf,
    pub selections: SelectionSession,
}

impl EditorSession {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            document: TextDocument::new(text),
            path: path.into(),
            selections: SelectionSession::new(),
        }
    }

    /// Read `path` into a new session.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        log::info!("session: opened {} ({} bytes)", path.display(), text.len());
        Ok(Self::new(path, text))
    }

    /// Immutable copy of the current document for a request.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot::new(self.path.clone(), self.document.lines())
    }

    /// Selections recorded since the last [`end_annotation`](Self::end_annotation).
    pub fn selections(&self) -> Vec<SelectionInformation> {
        self.selections.entries().to_vec()
    }

    /// Apply `changes` to the live document as one batch.
    ///
    /// Stale entries are skipped and logged; see [`ApplyReport::stale`].
    pub fn apply_changes(&mut self, changes: &[LineChange]) -> Result<ApplyReport, DocumentError> {
        apply_changes(&mut self.document, changes)
    }

    /// Write the document back to [`path`](Self::path).
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.document.text())
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        log::info!("session: saved {}", self.path.display());
        Ok(())
    }

    /// Drop all selections; the next request starts without annotations.
    pub fn end_annotation(&mut self) {
        self.selections.clear();
    }
}

// ---------------------------------------------------------------------------
// SharedSession
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`EditorSession`].  Cheap to clone.
pub type SharedSession = Arc<Mutex<EditorSession>>;

pub fn new_shared_session(session: EditorSession) -> SharedSession {
    Arc::new(Mutex::new(session))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::compute_changes;
    use tempfile::tempdir;

    #[test]
    fn open_edit_save_round_trip() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("lib.rs");
        std::fs::write(&path, "a\nb\nc\n").unwrap();

        let mut session = EditorSession::open(&path).expect("open");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.lines, vec!["a", "b", "c"]);
        assert_eq!(snapshot.path, path);

        let proposed: Vec<String> = vec!["a".into(), "c2".into()];
        let changes = compute_changes(&snapshot.lines, &proposed);
        let report = session.apply_changes(&changes).expect("apply");
        assert!(report.is_clean());

        session.save().expect("save");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nc2\n");
    }

    #[test]
    fn open_missing_file_fails_with_path() {
        let dir = tempdir().expect("temp dir");
        let err = EditorSession::open(dir.path().join("nope.rs")).unwrap_err();
        assert!(err.to_string().contains("nope.rs"));
    }

    #[test]
    fn stale_changes_are_reported() {
        let mut session = EditorSession::new("x", "one\n");
        let report = session
            .apply_changes(&[LineChange::modified(5, "five")])
            .expect("apply");
        assert_eq!(report.stale.len(), 1);
        assert_eq!(session.document.text(), "one\n");
    }

    #[test]
    fn end_annotation_clears_selections() {
        let mut session = EditorSession::new("x", "one\n");
        session.selections.record_text_selection(1, 1, "here");
        assert_eq!(session.selections().len(), 1);

        session.end_annotation();
        assert!(session.selections().is_empty());
    }

    #[test]
    fn shared_session_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SharedSession>();
    }
}
