//! Line-oriented text editing.
//!
//! Key types:
//!
//! - [`TextBuffer`]: rope-backed list of lines, always at least one
//! - [`EditBuffer`]: text, cursor and selection edited together
//! - [`Viewport`]: scrolling, hit testing and line geometry
//! - [`TextEditingCore`]: the event-driven engine behind a text widget
//!
//! # Examples
//!
//! ## Editing
//!
//! ```
//! use textcore::text::{EditBuffer, Position};
//!
//! let mut edit = EditBuffer::with_text("    if (x) {");
//! edit.set_cursor(Position::new(0, 12));
//! edit.newline(true, true, Some(4));
//! assert_eq!(edit.text(), "    if (x) {\n        ");
//! assert_eq!(edit.cursor(), Position::new(1, 8));
//! ```
//!
//! ## Searching
//!
//! ```
//! use textcore::text::{Direction, Position, TextBuffer, find_next};
//!
//! let buffer = TextBuffer::with_text("abc\ndef\nabc");
//! let hit = find_next(&buffer, Position::new(0, 0), "abc", true, Direction::Forward);
//! assert_eq!(hit.map(|m| m.position), Some(Position::new(2, 0)));
//! ```

mod buffer;
mod cursor;
mod edit;
mod editor;
mod redraw;
mod rope;
mod search;
mod selection;
mod viewport;

pub use buffer::TextBuffer;
pub use cursor::{Direction, Position, leading_spaces};
pub use edit::{EditBuffer, split_at_column};
pub use editor::{
    Clipboard, ClipboardKind, CodeBehavior, Committer, EnterAction, KeyOutcome, LineLayout,
    MultiLineBehavior, SearchHighlight, SingleLineBehavior, TabAction, TextEditingCore, TextRun,
    WidgetBehavior,
};
pub use redraw::RedrawScheduler;
pub use rope::{RopeWrapper, normalize_line_breaks};
pub use search::{SearchMatch, find_next, first_occurrence_in_line};
pub use selection::{Selection, WORD_BOUNDARY_CHARS};
pub use viewport::{Font, MonospaceMeasure, Rect, Scrollbar, Size, TextMeasure, Viewport};
