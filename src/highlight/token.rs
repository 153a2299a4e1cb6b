//! Token types for syntax highlighting.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Color class assigned to a classified run of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColorClass {
    Comment,
    StringLiteral,
    Reserved,
    Builtin,
    GlobalVar,
    NamespaceMarker,
    NumericLiteral,
    PlainText,
}

impl ColorClass {
    /// Number of color classes.
    pub const COUNT: usize = 8;

    /// Every class in declaration order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Comment,
        Self::StringLiteral,
        Self::Reserved,
        Self::Builtin,
        Self::GlobalVar,
        Self::NamespaceMarker,
        Self::NumericLiteral,
        Self::PlainText,
    ];

    #[must_use]
    pub const fn as_usize(self) -> usize {
        self as usize
    }

    /// Short label used in debug renderings of token runs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Comment => "comment",
            Self::StringLiteral => "string",
            Self::Reserved => "reserved",
            Self::Builtin => "builtin",
            Self::GlobalVar => "global",
            Self::NamespaceMarker => "namespace",
            Self::NumericLiteral => "number",
            Self::PlainText => "text",
        }
    }
}

/// A classified run within one line. `start` and `end` are character
/// columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub class: ColorClass,
    pub start: usize,
    pub end: usize,
}

impl Token {
    #[must_use]
    pub fn new(class: ColorClass, start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "token range must be start <= end");
        Self { class, start, end }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The characters of `line` this token covers.
    #[must_use]
    pub fn text(&self, line: &str) -> String {
        line.chars().skip(self.start).take(self.len()).collect()
    }
}
