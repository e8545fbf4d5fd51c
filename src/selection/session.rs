//! Selections accumulated during one drawing / annotation session.

use serde::{Deserialize, Serialize};

use super::stroke::{map_stroke_to_range, LineLayout, Point};

// ---------------------------------------------------------------------------
// SelectionInformation
// ---------------------------------------------------------------------------

/// A marked line range plus the text recognised for it.
///
/// `None` bounds could not be resolved from the stroke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionInformation {
    pub line_start: Option<usize>,
    pub line_end: Option<usize>,
    pub text: String,
}

impl SelectionInformation {
    /// Human-readable range, `?` for unresolved bounds.
    pub fn range_label(&self) -> String {
        let fmt = |b: Option<usize>| b.map_or_else(|| "?".to_string(), |n| n.to_string());
        format!("{}-{}", fmt(self.line_start), fmt(self.line_end))
    }
}

// ---------------------------------------------------------------------------
// SelectionSession
// ---------------------------------------------------------------------------

/// Ordered selections for the current annotation session.
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    entries: Vec<SelectionInformation>,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map `stroke` through `layout`, pair it with the recogniser's `text`
    /// and append it.  Unresolved bounds are logged; the entry is kept.
    pub fn record_stroke<L: LineLayout + ?Sized>(
        &mut self,
        stroke: &[Point],
        layout: &L,
        text: impl Into<String>,
    ) -> &SelectionInformation {
        let range = map_stroke_to_range(stroke, layout);
        for err in range.unresolved() {
            log::warn!("selection: {err}");
        }
        self.push(SelectionInformation {
            line_start: range.line_start,
            line_end: range.line_end,
            text: text.into(),
        })
    }

    /// Record a direct text selection (both bounds known).
    pub fn record_text_selection(
        &mut self,
        line_start: usize,
        line_end: usize,
        text: impl Into<String>,
    ) -> &SelectionInformation {
        self.push(SelectionInformation {
            line_start: Some(line_start.min(line_end)),
            line_end: Some(line_start.max(line_end)),
            text: text.into(),
        })
    }

    pub fn entries(&self) -> &[SelectionInformation] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End of the annotation session.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("selection: clearing {} selection(s)", self.entries.len());
        }
        self.entries.clear();
    }

    fn push(&mut self, info: SelectionInformation) -> &SelectionInformation {
        self.entries.push(info);
        &self.entries[self.entries.len() - 1]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::UniformLayout;

    fn layout() -> UniformLayout {
        UniformLayout {
            line_height: 10.0,
            top: 0.0,
            line_count: 30,
        }
    }

    #[test]
    fn strokes_accumulate_in_order() {
        let mut session = SelectionSession::new();
        session.record_stroke(&[Point::new(0.0, 5.0), Point::new(0.0, 25.0)], &layout(), "circle");
        session.record_stroke(&[Point::new(0.0, 105.0)], &layout(), "x");

        let entries = session.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].line_start, entries[0].line_end), (Some(1), Some(3)));
        assert_eq!(entries[1].text, "x");
        assert_eq!(entries[1].line_start, Some(11));
    }

    #[test]
    fn partially_resolved_stroke_is_still_recorded() {
        let mut session = SelectionSession::new();
        let info = session
            .record_stroke(&[Point::new(0.0, 15.0), Point::new(0.0, 9_000.0)], &layout(), "arrow")
            .clone();

        assert_eq!(info.line_start, Some(2));
        assert_eq!(info.line_end, None);
        assert_eq!(info.range_label(), "2-?");
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn text_selection_normalises_order() {
        let mut session = SelectionSession::new();
        let info = session.record_text_selection(9, 4, "fn foo").clone();
        assert_eq!((info.line_start, info.line_end), (Some(4), Some(9)));
    }

    #[test]
    fn clear_ends_the_session() {
        let mut session = SelectionSession::new();
        session.record_text_selection(1, 1, "a");
        session.clear();
        assert!(session.is_empty());
    }

    #[test]
    fn serialises_with_camel_case_keys() {
        let info = SelectionInformation {
            line_start: Some(1),
            line_end: None,
            text: "t".into(),
        };
        let json = serde_json::to_string(&info).unwrap();
        assert_eq!(json, r#"{"lineStart":1,"lineEnd":null,"text":"t"}"#);
    }
}
