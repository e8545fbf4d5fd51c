//! Line-change types shared by [`compute_changes`](super::compute_changes)
//! and [`apply_changes`](super::apply_changes).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// LineStatus
// ---------------------------------------------------------------------------

/// What happened to a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStatus {
    /// The line exists only in the proposed document.
    Added,
    /// The line exists only in the original document.
    Deleted,
    /// The original line at this position was rewritten in place.
    Modified,
}

impl LineStatus {
    /// Short label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            LineStatus::Added => "added",
            LineStatus::Deleted => "deleted",
            LineStatus::Modified => "modified",
        }
    }

    /// Diff-style marker (`+`, `-`, `~`).
    pub fn marker(&self) -> char {
        match self {
            LineStatus::Added => '+',
            LineStatus::Deleted => '-',
            LineStatus::Modified => '~',
        }
    }
}

impl std::fmt::Display for LineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// LineChange
// ---------------------------------------------------------------------------

/// One line-level edit.
///
/// `index` is 1-based. For [`LineStatus::Added`] it is the line's position
/// in the *resulting* document; for [`LineStatus::Deleted`] and
/// [`LineStatus::Modified`] it is the position in the *original* document.
/// `content` is ignored for deletions (it carries the removed text for
/// display only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    pub index: usize,
    pub content: String,
    pub status: LineStatus,
}

impl LineChange {
    pub fn added(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            status: LineStatus::Added,
        }
    }

    pub fn deleted(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            status: LineStatus::Deleted,
        }
    }

    pub fn modified(index: usize, content: impl Into<String>) -> Self {
        Self {
            index,
            content: content.into(),
            status: LineStatus::Modified,
        }
    }
}

impl std::fmt::Display for LineChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{:>5} {}", self.status.marker(), self.index, self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serialises_lowercase() {
        let change = LineChange::added(3, "let x = 1;");
        let json = serde_json::to_string(&change).unwrap();
        assert_eq!(
            json,
            r#"{"index":3,"content":"let x = 1;","status":"added"}"#
        );
    }

    #[test]
    fn display_uses_marker_and_index() {
        let change = LineChange::deleted(12, "old");
        assert_eq!(change.to_string(), "-   12 old");
    }
}
