//! Syntax highlighting for code widgets.
//!
//! A [`LanguageDefinition`] supplies comment markers, ordered keyword tables
//! and a [`Palette`]. [`SyntaxHighlighter`] classifies one line at a time,
//! carrying a single "inside a multi-line comment" flag from line to line,
//! and [`HighlightedBuffer`] caches the result per line.
//!
//! # Examples
//!
//! ```
//! use textcore::highlight::{ColorClass, LanguageDefinition, LineState, SyntaxHighlighter, Tokenizer};
//!
//! let highlighter = SyntaxHighlighter::from(LanguageDefinition::javascript());
//! let (tokens, state) = highlighter.tokenize_line("return x; /* note", LineState::Normal);
//! assert_eq!(tokens[0].class, ColorClass::Reserved);
//! assert_eq!(state, LineState::InComment);
//! ```

mod highlighted_buffer;
mod language;
mod palette;
pub mod token;
pub mod tokenizer;

#[cfg(test)]
#[path = "tests/tokenizer_tests.rs"]
mod tokenizer_tests;

pub use highlighted_buffer::HighlightedBuffer;
pub use language::{CommentDelimiters, LanguageDefinition, LanguageRegistry};
pub use palette::Palette;
pub use token::{ColorClass, Token};
pub use tokenizer::{LineState, SyntaxHighlighter, Tokenizer};
