//! Freehand-drawing selections.
//!
//! ```text
//! stroke points ──map_stroke_to_range──▶ StrokeRange ─┐
//! recogniser text ─────────────────────────────────────┴─▶ SelectionInformation
//!                                                          (SelectionSession)
//! ```
//!
//! The recogniser that turns a stroke into text lives outside this crate;
//! its output is passed to [`SelectionSession::record_stroke`].

pub mod session;
pub mod stroke;

pub use session::{SelectionInformation, SelectionSession};
pub use stroke::{
    map_stroke_to_range, Bound, LineLayout, Point, StrokeRange, UniformLayout,
    UnresolvedSelectionError,
};
