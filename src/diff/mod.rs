//! Line-change diff engine.
//!
//! * [`compute_changes`]: proposed document body → ordered [`LineChange`]s.
//! * [`apply_changes`]: [`LineChange`]s → one atomic batch on a
//!   [`DocumentHost`].
//! * [`TextDocument`]: in-memory host.
//!
//! # Round trip
//!
//! ```rust
//! use voice_code_editor::diff::{apply_changes, compute_changes, TextDocument};
//!
//! let original: Vec<String> = ["a", "b", "c"].map(String::from).to_vec();
//! let proposed: Vec<String> = ["a", "c2"].map(String::from).to_vec();
//!
//! let changes = compute_changes(&original, &proposed);
//! let mut doc = TextDocument::from_lines(&original);
//! apply_changes(&mut doc, &changes).unwrap();
//! assert_eq!(doc.lines(), proposed);
//! ```

pub mod apply;
pub mod compute;
pub mod document;
pub mod types;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use apply::{apply_changes, ApplyReport, StaleEditError};
pub use compute::compute_changes;
pub use document::{DocumentError, DocumentHost, LineSpan, TextDocument, TextEdit};
pub use types::{LineChange, LineStatus};
