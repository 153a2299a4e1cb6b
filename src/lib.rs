//! `textcore` - line-oriented text editing engine
//!
//! Rope-backed text storage with a cursor and selection model, editing
//! operations with indentation awareness, wraparound search, a per-line
//! keyword syntax highlighter, and a viewport that maps between text
//! positions and pixels. [`TextEditingCore`] ties these together into the
//! event-driven engine behind single-line fields, text areas and code
//! editors.
//!
//! # Example
//!
//! ```
//! use textcore::{KeyCode, KeyEvent, TextEditingCore};
//!
//! let mut core = TextEditingCore::code_edit(None);
//! core.value_from_model(Some("function f() {"));
//! core.key_down(KeyEvent::key(KeyCode::End));
//! core.key_down(KeyEvent::key(KeyCode::Enter));
//! assert_eq!(core.text(), "function f() {\n    ");
//! ```

// Crate-level lint configuration
#![allow(clippy::cast_possible_truncation)] // Pixel to column conversions
#![allow(clippy::cast_sign_loss)] // Clamped offsets before conversion
#![allow(clippy::cast_precision_loss)] // Line counts as pixel heights
#![allow(clippy::module_name_repetitions)] // Allow text::TextBuffer etc
#![allow(clippy::struct_excessive_bools)] // Config carries independent switches
#![allow(clippy::missing_errors_doc)] // Errors are documented on the Error enum
#![allow(clippy::missing_panics_doc)] // Non-test code does not panic
#![allow(clippy::missing_const_for_fn)] // Many functions could be const, not critical
#![allow(clippy::doc_markdown)] // Allow technical names without backticks
#![allow(clippy::use_self)] // Allow explicit type names in impl blocks
#![allow(clippy::needless_pass_by_value)] // Allow pass by value for small Copy types
#![allow(clippy::suboptimal_flops)] // Standard math notation is clearer than mul_add
#![allow(clippy::collapsible_if)] // Sometimes nested ifs are clearer
#![allow(clippy::cast_lossless)] // as casts are fine for primitive widening
#![allow(clippy::items_after_statements)] // Common pattern in tests
#![allow(clippy::semicolon_if_nothing_returned)] // Style preference

pub mod color;
pub mod config;
pub mod error;
pub mod highlight;
pub mod input;
pub mod text;
pub mod unicode;

// Re-export core types at crate root
pub use color::Rgba;
pub use config::{EditFlags, EditorConfig};
pub use error::{Error, Result};

// Re-export input types
pub use input::{KeyCode, KeyEvent, KeyModifiers};

// Re-export commonly used types
pub use highlight::{
    ColorClass, HighlightedBuffer, LanguageDefinition, LanguageRegistry, LineState, Palette,
    SyntaxHighlighter, Token, Tokenizer,
};
pub use text::{
    Direction, EditBuffer, Position, Selection, TextBuffer, TextEditingCore, Viewport,
};
pub use unicode::WidthMethod;
