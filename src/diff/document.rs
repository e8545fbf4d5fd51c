//! The document-host boundary and an in-memory implementation.
//!
//! [`DocumentHost`] is what [`apply_changes`](super::apply_changes) needs
//! from a live editor: line lookup by number and by offset, and one
//! primitive that applies a whole batch of [`TextEdit`]s atomically.  Every
//! edit in a batch is expressed against the document *as it was before the
//! batch*; the host is responsible for applying them without any offset in
//! the batch having to account for another edit in the same batch.
//!
//! [`TextDocument`] is the `String`-backed host used by the CLI, the editor
//! session and the tests.

use thiserror::Error;

// ---------------------------------------------------------------------------
// DocumentError
// ---------------------------------------------------------------------------

/// Host-level failures. Any of these rejects the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// An edit references a byte range outside the document or splits a
    /// UTF-8 character.
    #[error("edit range {from}..{to} is outside the document (len {len})")]
    OutOfBounds { from: usize, to: usize, len: usize },

    /// Two edits in one batch touch the same text.
    #[error("edits {first:?} and {second:?} overlap")]
    Overlapping {
        first: (usize, usize),
        second: (usize, usize),
    },
}

// ---------------------------------------------------------------------------
// LineSpan / TextEdit
// ---------------------------------------------------------------------------

/// Byte offsets of one line.
///
/// `from..to` is the line content; `to..end` is its line break (`\n` or
/// `\r\n`), empty for a final line without a break.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    /// 1-based line number.
    pub number: usize,
    pub from: usize,
    pub to: usize,
    pub end: usize,
}

impl LineSpan {
    /// `true` when the line is followed by a line break.
    pub fn has_break(&self) -> bool {
        self.end > self.to
    }
}

/// Replace `from..to` of the pre-batch text with `insert`.
///
/// An insertion has `from == to`; a deletion has an empty `insert`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub from: usize,
    pub to: usize,
    pub insert: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            from: at,
            to: at,
            insert: text.into(),
        }
    }

    pub fn delete(from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            insert: String::new(),
        }
    }

    pub fn replace(from: usize, to: usize, text: impl Into<String>) -> Self {
        Self {
            from,
            to,
            insert: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// DocumentHost
// ---------------------------------------------------------------------------

/// A live document that line changes can be applied to.
pub trait DocumentHost {
    /// Number of lines currently in the document.
    fn line_count(&self) -> usize;

    /// Span of line `number` (1-based), or `None` when out of range.
    fn line(&self, number: usize) -> Option<LineSpan>;

    /// The line containing byte `offset` (a break belongs to its line).
    ///
    /// Not needed by `apply_changes`; hosts use it to map a cursor offset to
    /// its line, e.g. when splitting prefix and suffix for inline suggestions.
    fn line_at(&self, offset: usize) -> Option<LineSpan>;

    /// Document length in bytes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply every edit as one atomic change. All offsets refer to the
    /// document before the batch.
    fn apply_batch(&mut self, edits: Vec<TextEdit>) -> Result<(), DocumentError>;
}

// ---------------------------------------------------------------------------
// TextDocument
// ---------------------------------------------------------------------------

/// `String`-backed [`DocumentHost`].
///
/// Empty text has no lines, and a trailing break does not start a new line:
/// `"a\nb\n"` and `"a\nb"` both have two lines.
///
/// ```
/// use voice_code_editor::diff::{DocumentHost, TextDocument};
///
/// let doc = TextDocument::from_lines(&["fn main() {", "}"]);
/// assert_eq!(doc.text(), "fn main() {\n}\n");
/// assert_eq!(doc.line_count(), 2);
/// assert_eq!(doc.lines(), vec!["fn main() {", "}"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextDocument {
    text: String,
    spans: Vec<LineSpan>,
}

impl TextDocument {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let spans = index_lines(&text);
        Self { text, spans }
    }

    /// Build a document where every line is terminated by `\n`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Self {
        let mut text = String::new();
        for line in lines {
            text.push_str(line.as_ref());
            text.push('\n');
        }
        Self::new(text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Line contents without their breaks.
    pub fn lines(&self) -> Vec<String> {
        self.spans
            .iter()
            .map(|s| self.text[s.from..s.to].to_string())
            .collect()
    }
}

impl DocumentHost for TextDocument {
    fn line_count(&self) -> usize {
        self.spans.len()
    }

    fn line(&self, number: usize) -> Option<LineSpan> {
        number
            .checked_sub(1)
            .and_then(|i| self.spans.get(i))
            .copied()
    }

    fn line_at(&self, offset: usize) -> Option<LineSpan> {
        let idx = self.spans.partition_point(|s| s.from <= offset);
        let span = self.spans.get(idx.checked_sub(1)?)?;
        (offset <= span.end).then_some(*span)
    }

    fn len(&self) -> usize {
        self.text.len()
    }

    fn apply_batch(&mut self, mut edits: Vec<TextEdit>) -> Result<(), DocumentError> {
        let len = self.text.len();
        for e in &edits {
            if e.from > e.to
                || e.to > len
                || !self.text.is_char_boundary(e.from)
                || !self.text.is_char_boundary(e.to)
            {
                return Err(DocumentError::OutOfBounds {
                    from: e.from,
                    to: e.to,
                    len,
                });
            }
        }

        // Stable: insertions at one offset keep their batch order and sort
        // ahead of a range starting at that offset.
        edits.sort_by_key(|e| (e.from, e.to));
        for pair in edits.windows(2) {
            if pair[0].to > pair[1].from {
                return Err(DocumentError::Overlapping {
                    first: (pair[0].from, pair[0].to),
                    second: (pair[1].from, pair[1].to),
                });
            }
        }

        let inserted: usize = edits.iter().map(|e| e.insert.len()).sum();
        let mut out = String::with_capacity(len + inserted);
        let mut cursor = 0;
        for e in &edits {
            out.push_str(&self.text[cursor..e.from]);
            out.push_str(&e.insert);
            cursor = e.to;
        }
        out.push_str(&self.text[cursor..]);

        log::debug!("document: applied batch of {} edit(s)", edits.len());
        *self = Self::new(out);
        Ok(())
    }
}

fn index_lines(text: &str) -> Vec<LineSpan> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, b) in text.bytes().enumerate() {
        if b == b'\n' {
            let to = if i > start && text.as_bytes()[i - 1] == b'\r' {
                i - 1
            } else {
                i
            };
            spans.push(LineSpan {
                number: spans.len() + 1,
                from: start,
                to,
                end: i + 1,
            });
            start = i + 1;
        }
    }
    if start < text.len() {
        spans.push(LineSpan {
            number: spans.len() + 1,
            from: start,
            to: text.len(),
            end: text.len(),
        });
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_lines() {
        let doc = TextDocument::new("");
        assert_eq!(doc.line_count(), 0);
        assert!(doc.lines().is_empty());
    }

    #[test]
    fn unterminated_last_line_is_counted() {
        let doc = TextDocument::new("a\nb");
        assert_eq!(doc.lines(), vec!["a", "b"]);
        let last = doc.line(2).unwrap();
        assert!(!last.has_break());
        assert_eq!((last.from, last.to, last.end), (2, 3, 3));
    }

    #[test]
    fn crlf_break_is_excluded_from_content() {
        let doc = TextDocument::new("a\r\nb\r\n");
        assert_eq!(doc.lines(), vec!["a", "b"]);
        let first = doc.line(1).unwrap();
        assert_eq!((first.to, first.end), (1, 3));
    }

    #[test]
    fn blank_lines_are_preserved() {
        let doc = TextDocument::new("a\n\nb\n");
        assert_eq!(doc.lines(), vec!["a", "", "b"]);
    }

    #[test]
    fn line_lookup_out_of_range() {
        let doc = TextDocument::from_lines(&["x"]);
        assert!(doc.line(0).is_none());
        assert!(doc.line(2).is_none());
    }

    #[test]
    fn line_at_maps_offsets_and_breaks() {
        let doc = TextDocument::from_lines(&["ab", "cd"]);
        assert_eq!(doc.line_at(0).unwrap().number, 1);
        assert_eq!(doc.line_at(2).unwrap().number, 1); // the break
        assert_eq!(doc.line_at(3).unwrap().number, 2);
        assert_eq!(doc.line_at(6).unwrap().number, 2); // end of text
        assert!(doc.line_at(7).is_none());
    }

    #[test]
    fn batch_offsets_refer_to_pre_edit_text() {
        let mut doc = TextDocument::from_lines(&["a", "b", "c"]);
        // Insert before "b", delete "c" line, rewrite "a".
        doc.apply_batch(vec![
            TextEdit::insert(2, "X\n"),
            TextEdit::delete(4, 6),
            TextEdit::replace(0, 1, "A"),
        ])
        .unwrap();
        assert_eq!(doc.text(), "A\nX\nb\n");
    }

    #[test]
    fn insertion_sorts_before_range_at_same_offset() {
        let mut doc = TextDocument::from_lines(&["a", "b"]);
        doc.apply_batch(vec![TextEdit::replace(2, 3, "B"), TextEdit::insert(2, "X\n")])
            .unwrap();
        assert_eq!(doc.lines(), vec!["a", "X", "B"]);
    }

    #[test]
    fn overlapping_edits_reject_the_batch() {
        let mut doc = TextDocument::from_lines(&["abc"]);
        let err = doc
            .apply_batch(vec![TextEdit::delete(0, 2), TextEdit::replace(1, 3, "z")])
            .unwrap_err();
        assert!(matches!(err, DocumentError::Overlapping { .. }));
        assert_eq!(doc.text(), "abc\n");
    }

    #[test]
    fn out_of_bounds_edit_rejects_the_batch() {
        let mut doc = TextDocument::from_lines(&["abc"]);
        let err = doc.apply_batch(vec![TextEdit::insert(99, "x")]).unwrap_err();
        assert_eq!(
            err,
            DocumentError::OutOfBounds {
                from: 99,
                to: 99,
                len: 4
            }
        );
    }
}
