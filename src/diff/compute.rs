//! `compute_changes`: line-granularity diff between two document bodies.
//!
//! Alignment comes from `similar` (Myers).  Equal runs are dropped, pure
//! deletes and inserts map straight to [`LineStatus::Deleted`] and
//! [`LineStatus::Added`].  A replace block is split further:
//!
//! * same length on both sides → one `Modified` per line;
//! * different lengths → the shorter side is laid against the contiguous
//!   window of the longer side with the highest character similarity, the
//!   paired lines become `Modified`, the surplus becomes `Deleted` (old side)
//!   or `Added` (new side).

use similar::{DiffOp, TextDiff};

use super::types::LineChange;

/// Diff `original` against `proposed`.
///
/// Applying the result to `original` with
/// [`apply_changes`](super::apply_changes) reproduces `proposed`.
///
/// ```
/// use voice_code_editor::diff::{compute_changes, LineChange};
///
/// let original = ["a", "b", "c"].map(String::from);
/// let proposed = ["a", "X", "Y", "b", "c"].map(String::from);
/// assert_eq!(
///     compute_changes(&original, &proposed),
///     vec![LineChange::added(2, "X"), LineChange::added(3, "Y")],
/// );
/// ```
pub fn compute_changes(original: &[String], proposed: &[String]) -> Vec<LineChange> {
    let old: Vec<&str> = original.iter().map(String::as_str).collect();
    let new: Vec<&str> = proposed.iter().map(String::as_str).collect();

    let diff = TextDiff::from_slices(&old, &new);
    let mut changes = Vec::new();

    for op in diff.ops() {
        match *op {
            DiffOp::Equal { .. } => {}
            DiffOp::Delete {
                old_index, old_len, ..
            } => {
                for i in old_index..old_index + old_len {
                    changes.push(LineChange::deleted(i + 1, old[i]));
                }
            }
            DiffOp::Insert {
                new_index, new_len, ..
            } => {
                for j in new_index..new_index + new_len {
                    changes.push(LineChange::added(j + 1, new[j]));
                }
            }
            DiffOp::Replace {
                old_index,
                old_len,
                new_index,
                new_len,
            } => {
                let old_block = &old[old_index..old_index + old_len];
                let new_block = &new[new_index..new_index + new_len];
                split_replace(old_index, old_block, new_index, new_block, &mut changes);
            }
        }
    }

    log::debug!(
        "diff: {} original line(s), {} proposed line(s), {} change(s)",
        original.len(),
        proposed.len(),
        changes.len()
    );
    changes
}

fn split_replace(
    old_index: usize,
    old_block: &[&str],
    new_index: usize,
    new_block: &[&str],
    out: &mut Vec<LineChange>,
) {
    if old_block.len() >= new_block.len() {
        let w = best_window(old_block, new_block);
        for (i, line) in old_block.iter().enumerate() {
            let number = old_index + i + 1;
            if i >= w && i < w + new_block.len() {
                out.push(LineChange::modified(number, new_block[i - w]));
            } else {
                out.push(LineChange::deleted(number, *line));
            }
        }
    } else {
        let w = best_window(new_block, old_block);
        for (j, line) in new_block.iter().enumerate() {
            if j >= w && j < w + old_block.len() {
                out.push(LineChange::modified(old_index + (j - w) + 1, *line));
            } else {
                out.push(LineChange::added(new_index + j + 1, *line));
            }
        }
    }
}

/// Offset into `long` where `short` lines up best.  Earliest offset wins ties.
fn best_window(long: &[&str], short: &[&str]) -> usize {
    if long.len() == short.len() {
        return 0;
    }

    let mut best = 0;
    let mut best_score = f32::MIN;
    for w in 0..=long.len() - short.len() {
        let score: f32 = short
            .iter()
            .zip(&long[w..])
            .map(|(s, l)| TextDiff::from_chars(*l, *s).ratio())
            .sum();
        if score > best_score {
            best_score = score;
            best = w;
        }
    }
    best
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
