//! Stroke-to-line-range mapping.
//!
//! A freehand stroke is a list of pixel points in the editor's content
//! coordinates.  Its vertical extent (`min y`, `max y`) is looked up in the
//! rendering surface's line layout to get the first and last document line
//! it covers.  Points outside the rendered area resolve to nothing; that
//! bound is reported as unresolved instead of failing the whole mapping.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Point / LineLayout
// ---------------------------------------------------------------------------

/// A stroke sample in content pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Line lookup exposed by the rendering surface.
pub trait LineLayout {
    /// 1-based line number rendered at pixel height `y`, or `None` when `y`
    /// is outside the rendered area.
    fn line_at_height(&self, y: f32) -> Option<usize>;
}

impl<F> LineLayout for F
where
    F: Fn(f32) -> Option<usize>,
{
    fn line_at_height(&self, y: f32) -> Option<usize> {
        self(y)
    }
}

/// Fixed-height line layout, the common case for a monospace editor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformLayout {
    /// Pixel height of one line.
    pub line_height: f32,
    /// Pixel offset of line 1 from the top of the content area.
    pub top: f32,
    /// Number of rendered lines.
    pub line_count: usize,
}

impl LineLayout for UniformLayout {
    fn line_at_height(&self, y: f32) -> Option<usize> {
        if !y.is_finite() || self.line_height <= 0.0 || y < self.top {
            return None;
        }
        let line = ((y - self.top) / self.line_height).floor() as usize + 1;
        (line <= self.line_count).then_some(line)
    }
}

// ---------------------------------------------------------------------------
// UnresolvedSelectionError
// ---------------------------------------------------------------------------

/// Which end of a stroke range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Start,
    End,
}

/// A stroke bound that could not be mapped to a line.
///
/// Never fatal: the selection is still recorded with the other bound.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{bound:?} of stroke (y = {pixel_y:?}) is outside the rendered lines")]
pub struct UnresolvedSelectionError {
    pub bound: Bound,
    /// `None` when the stroke had no usable points at all.
    pub pixel_y: Option<f32>,
}

// ---------------------------------------------------------------------------
// StrokeRange
// ---------------------------------------------------------------------------

/// Line range covered by a stroke; `None` marks an unresolved bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeRange {
    pub line_start: Option<usize>,
    pub line_end: Option<usize>,
    min_y: Option<f32>,
    max_y: Option<f32>,
}

impl StrokeRange {
    /// Both bounds resolved.
    pub fn is_complete(&self) -> bool {
        self.line_start.is_some() && self.line_end.is_some()
    }

    /// One error per unresolved bound, for caller-level notification.
    pub fn unresolved(&self) -> Vec<UnresolvedSelectionError> {
        let mut out = Vec::new();
        if self.line_start.is_none() {
            out.push(UnresolvedSelectionError {
                bound: Bound::Start,
                pixel_y: self.min_y,
            });
        }
        if self.line_end.is_none() {
            out.push(UnresolvedSelectionError {
                bound: Bound::End,
                pixel_y: self.max_y,
            });
        }
        out
    }
}

/// Map a stroke's vertical extent to the document lines it covers.
///
/// Non-finite `y` values are ignored.  An empty stroke yields two unresolved
/// bounds.
///
/// ```
/// use voice_code_editor::selection::{map_stroke_to_range, Point, UniformLayout};
///
/// let layout = UniformLayout { line_height: 20.0, top: 0.0, line_count: 50 };
/// let stroke = [Point::new(4.0, 45.0), Point::new(90.0, 101.0), Point::new(30.0, 62.0)];
/// let range = map_stroke_to_range(&stroke, &layout);
/// assert_eq!(range.line_start, Some(3));
/// assert_eq!(range.line_end, Some(6));
/// ```
pub fn map_stroke_to_range<L: LineLayout + ?Sized>(stroke: &[Point], layout: &L) -> StrokeRange {
    let mut ys = stroke.iter().map(|p| p.y).filter(|y| y.is_finite());

    let (min_y, max_y) = match ys.next() {
        Some(first) => {
            let (lo, hi) = ys.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y)));
            (Some(lo), Some(hi))
        }
        None => (None, None),
    };

    let range = StrokeRange {
        line_start: min_y.and_then(|y| layout.line_at_height(y)),
        line_end: max_y.and_then(|y| layout.line_at_height(y)),
        min_y,
        max_y,
    };

    log::debug!(
        "stroke: {} point(s), y {:?}..{:?} → lines {:?}..{:?}",
        stroke.len(),
        min_y,
        max_y,
        range.line_start,
        range.line_end
    );
    range
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> UniformLayout {
        UniformLayout {
            line_height: 20.0,
            top: 10.0,
            line_count: 10,
        }
    }

    #[test]
    fn maps_extent_to_first_and_last_line() {
        let stroke = [Point::new(0.0, 35.0), Point::new(5.0, 15.0), Point::new(9.0, 72.0)];
        let range = map_stroke_to_range(&stroke, &layout());
        assert_eq!(range.line_start, Some(1));
        assert_eq!(range.line_end, Some(4));
        assert!(range.is_complete());
        assert!(range.unresolved().is_empty());
    }

    #[test]
    fn single_point_covers_one_line() {
        let range = map_stroke_to_range(&[Point::new(1.0, 55.0)], &layout());
        assert_eq!((range.line_start, range.line_end), (Some(3), Some(3)));
    }

    #[test]
    fn point_below_viewport_leaves_end_unresolved() {
        // Rendered lines cover y 10..210.
        let stroke = [Point::new(0.0, 50.0), Point::new(0.0, 400.0)];
        let range = map_stroke_to_range(&stroke, &layout());

        assert_eq!(range.line_start, Some(3));
        assert_eq!(range.line_end, None);
        assert!(!range.is_complete());

        let unresolved = range.unresolved();
        assert_eq!(
            unresolved,
            vec![UnresolvedSelectionError {
                bound: Bound::End,
                pixel_y: Some(400.0),
            }]
        );
    }

    #[test]
    fn point_above_viewport_leaves_start_unresolved() {
        let stroke = [Point::new(0.0, -3.0), Point::new(0.0, 30.0)];
        let range = map_stroke_to_range(&stroke, &layout());
        assert_eq!((range.line_start, range.line_end), (None, Some(2)));
        assert_eq!(range.unresolved()[0].bound, Bound::Start);
    }

    #[test]
    fn empty_stroke_is_fully_unresolved() {
        let range = map_stroke_to_range(&[], &layout());
        assert_eq!((range.line_start, range.line_end), (None, None));
        assert_eq!(range.unresolved().len(), 2);
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let stroke = [Point::new(0.0, f32::NAN), Point::new(0.0, 30.0)];
        let range = map_stroke_to_range(&stroke, &layout());
        assert_eq!((range.line_start, range.line_end), (Some(2), Some(2)));
    }

    #[test]
    fn closures_work_as_layouts() {
        let lookup = |y: f32| if y < 100.0 { Some(7) } else { None };
        let range = map_stroke_to_range(&[Point::new(0.0, 1.0), Point::new(0.0, 150.0)], &lookup);
        assert_eq!((range.line_start, range.line_end), (Some(7), None));
    }
}
