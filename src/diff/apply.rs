//! `apply_changes`: turn a list of [`LineChange`]s into one atomic batch of
//! text edits against a live [`DocumentHost`].
//!
//! # Batch construction
//!
//! ```text
//! changes ──partition──▶ Added / Deleted / Modified   (input order kept)
//!   Added    ──sort + merge runs──▶ one insertion per run, anchored in the
//!                                    pre-edit document
//!   Deleted  ──▶ one deletion per line (line + its break)
//!   Modified ──▶ one replacement per line (content only)
//!   all edits ──▶ DocumentHost::apply_batch   (single dispatch)
//! ```
//!
//! Every offset is read from the document before the batch, so no edit has
//! to know what the others do to positions.
//!
//! `Added` indices are positions in the *resulting* document.  A run
//! starting at resulting line `r` is preceded by `r - 1` lines in the result;
//! subtracting the added lines of earlier runs leaves `k`, the number of
//! surviving original lines in front of it.  The anchor is the first
//! original line preceded by exactly `k` non-deleted lines.
//!
//! Inserted lines use the document's own break style (`\r\n` when its first
//! break is one).  A document without a final break keeps it that way, except
//! when the last resulting line is empty: that line only exists if a break
//! follows it, so one is added.

use std::collections::BTreeSet;

use thiserror::Error;

use super::document::{DocumentError, DocumentHost, LineSpan, TextEdit};
use super::types::{LineChange, LineStatus};

// ---------------------------------------------------------------------------
// StaleEditError / ApplyReport
// ---------------------------------------------------------------------------

/// A change whose line no longer exists in the live document.
///
/// The operation is skipped; the rest of the batch still applies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status} line {index} is outside the document ({line_count} lines)")]
pub struct StaleEditError {
    pub index: usize,
    pub status: LineStatus,
    pub line_count: usize,
}

/// Outcome of [`apply_changes`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    /// Number of text edits dispatched in the batch.
    pub applied: usize,
    /// Changes that were dropped because their line is gone.
    pub stale: Vec<StaleEditError>,
}

impl ApplyReport {
    pub fn is_clean(&self) -> bool {
        self.stale.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Added runs
// ---------------------------------------------------------------------------

/// Consecutive `Added` entries merged into one insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AddedRun {
    /// Resulting-document index of the first line.
    pub first: usize,
    pub lines: Vec<String>,
}

impl AddedRun {
    fn content(&self, newline: &str) -> String {
        self.lines.join(newline)
    }

    fn ends_empty(&self) -> bool {
        self.lines.last().is_some_and(|l| l.is_empty())
    }
}

/// Sort `added` by index and merge runs where entry `k` has index
/// `first + k`.
pub(crate) fn merge_added_runs(added: &[&LineChange]) -> Vec<AddedRun> {
    let mut sorted = added.to_vec();
    sorted.sort_by_key(|c| c.index);

    let mut runs: Vec<AddedRun> = Vec::new();
    for change in sorted {
        match runs.last_mut() {
            Some(run) if change.index == run.first + run.lines.len() => {
                run.lines.push(change.content.clone());
            }
            _ => runs.push(AddedRun {
                first: change.index,
                lines: vec![change.content.clone()],
            }),
        }
    }
    runs
}

/// Break style of the first terminated line, `\n` when there is none.
fn line_break<D: DocumentHost + ?Sized>(doc: &D) -> &'static str {
    (1..=doc.line_count())
        .filter_map(|n| doc.line(n))
        .find(LineSpan::has_break)
        .map_or("\n", |span| if span.end - span.to == 2 { "\r\n" } else { "\n" })
}

/// First original line preceded by exactly `k` surviving lines.
fn anchor_for(k: usize, deleted: &BTreeSet<usize>) -> usize {
    let mut anchor = k + 1;
    for &d in deleted {
        if d < anchor {
            anchor += 1;
        } else {
            break;
        }
    }
    anchor
}

// ---------------------------------------------------------------------------
// apply_changes
// ---------------------------------------------------------------------------

/// Apply `changes` to `doc` as one batch.
///
/// Changes that point outside the document are reported in
/// [`ApplyReport::stale`] and skipped.  A [`DocumentError`] from the host
/// means nothing was applied.
///
/// ```
/// use voice_code_editor::diff::{apply_changes, LineChange, TextDocument};
///
/// let mut doc = TextDocument::from_lines(&["a", "b", "c"]);
/// let report = apply_changes(
///     &mut doc,
///     &[LineChange::added(2, "X"), LineChange::added(3, "Y")],
/// )
/// .unwrap();
/// assert_eq!(report.applied, 1); // merged into one insertion
/// assert_eq!(doc.lines(), vec!["a", "X", "Y", "b", "c"]);
/// ```
pub fn apply_changes<D: DocumentHost + ?Sized>(
    doc: &mut D,
    changes: &[LineChange],
) -> Result<ApplyReport, DocumentError> {
    // 1. Partition.
    let mut added = Vec::new();
    let mut deleted = Vec::new();
    let mut modified = Vec::new();
    for change in changes {
        match change.status {
            LineStatus::Added => added.push(change),
            LineStatus::Deleted => deleted.push(change),
            LineStatus::Modified => modified.push(change),
        }
    }

    let line_count = doc.line_count();
    let newline = line_break(doc);
    let mut report = ApplyReport::default();
    let mut edits = Vec::with_capacity(changes.len());

    let in_range = |index: usize| (1..=line_count).contains(&index);

    let mut deleted_lines = BTreeSet::new();
    for change in &deleted {
        if in_range(change.index) {
            deleted_lines.insert(change.index);
        } else {
            report.stale.push(stale(change.index, LineStatus::Deleted, line_count));
        }
    }

    // An unterminated last line has no break to delete with it, so a run of
    // deletions reaching it also takes the break in front of the run.
    let last = doc.line(line_count);
    let tail_start = match last {
        Some(span) if !span.has_break() && deleted_lines.contains(&line_count) => {
            let mut s = line_count;
            while s > 1 && deleted_lines.contains(&(s - 1)) {
                s -= 1;
            }
            Some(s)
        }
        _ => None,
    };

    // 2 + 3. Insertions.
    let mut added_before = 0;
    // Edit index of the insertion at the end of the document, and whether its
    // last line is empty.
    let mut tail_insert: Option<(usize, bool)> = None;
    for run in merge_added_runs(&added) {
        let k = run.first.saturating_sub(1).saturating_sub(added_before);
        added_before += run.lines.len();

        if run.first == 0 {
            report.stale.push(stale(run.first, LineStatus::Added, line_count));
            continue;
        }

        let anchor = anchor_for(k, &deleted_lines);
        let at_tail = tail_start.is_some_and(|s| anchor >= s);

        if anchor <= line_count && !at_tail {
            if let Some(span) = doc.line(anchor) {
                edits.push(TextEdit::insert(span.from, run.content(newline) + newline));
            }
        } else if anchor == line_count + 1 || at_tail {
            let text = match (last, tail_start) {
                (None, _) => run.content(newline) + newline,
                (Some(span), _) if span.has_break() => run.content(newline) + newline,
                (Some(_), Some(1)) => run.content(newline),
                (Some(_), _) => format!("{newline}{}", run.content(newline)),
            };
            tail_insert = Some((edits.len(), run.ends_empty()));
            edits.push(TextEdit::insert(doc.len(), text));
        } else {
            report.stale.push(stale(run.first, LineStatus::Added, line_count));
        }
    }

    // 3. Deletions.
    for &number in &deleted_lines {
        if tail_start.is_some_and(|s| number >= s) {
            continue;
        }
        if let Some(span) = doc.line(number) {
            edits.push(TextEdit::delete(span.from, span.end));
        }
    }
    if let (Some(s), Some(span)) = (tail_start, last) {
        let from = if s > 1 {
            doc.line(s - 1).map_or(span.from, |prev| prev.to)
        } else {
            0
        };
        edits.push(TextEdit::delete(from, span.to));
    }

    // 3. Replacements.
    for change in &modified {
        match doc.line(change.index) {
            Some(span) => edits.push(TextEdit::replace(span.from, span.to, change.content.clone())),
            None => report.stale.push(stale(change.index, LineStatus::Modified, line_count)),
        }
    }

    // The result ends without a break, so an empty final line needs one.
    if last.is_some_and(|span| !span.has_break()) {
        let ends_empty = match tail_insert {
            Some((_, empty)) => empty,
            None => last_surviving_is_empty(doc, &deleted_lines, &modified),
        };
        if ends_empty {
            match tail_insert {
                Some((i, _)) => edits[i].insert.push_str(newline),
                None => edits.push(TextEdit::insert(doc.len(), newline)),
            }
        }
    }

    // 4. One dispatch.
    report.applied = edits.len();
    doc.apply_batch(edits)?;

    for s in &report.stale {
        log::warn!("apply: skipped stale change: {s}");
    }
    log::debug!(
        "apply: {} edit(s) applied, {} stale",
        report.applied,
        report.stale.len()
    );

    Ok(report)
}

/// Whether the last non-deleted original line is empty after replacements.
fn last_surviving_is_empty<D: DocumentHost + ?Sized>(
    doc: &D,
    deleted: &BTreeSet<usize>,
    modified: &[&LineChange],
) -> bool {
    let Some(number) = (1..=doc.line_count()).rev().find(|n| !deleted.contains(n)) else {
        return false;
    };
    match modified.iter().rev().find(|c| c.index == number) {
        Some(change) => change.content.is_empty(),
        None => doc.line(number).is_some_and(|span| span.from == span.to),
    }
}

fn stale(index: usize, status: LineStatus, line_count: usize) -> StaleEditError {
    StaleEditError {
        index,
        status,
        line_count,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
