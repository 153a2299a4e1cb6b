//! Line-addressed rope using the ropey crate.
//!
//! Only LF is a line break here (ropey is built without CR and Unicode line
//! break support), so `len_lines` always equals the number of LF-separated
//! lines and a trailing LF yields a final empty line.

use ropey::{Rope, RopeSlice};
use std::borrow::Cow;

/// Normalize CRLF and lone CR to LF.
#[must_use]
pub fn normalize_line_breaks(text: &str) -> Cow<'_, str> {
    if !text.contains('\r') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\r' {
            if chars.peek() == Some(&'\n') {
                chars.next();
            }
            out.push('\n');
        } else {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Wrapper around `ropey::Rope` with line-oriented helpers.
#[derive(Clone, Debug, Default)]
pub struct RopeWrapper {
    rope: Rope,
}

impl RopeWrapper {
    /// Create an empty rope (one empty line).
    #[must_use]
    pub fn new() -> Self {
        Self { rope: Rope::new() }
    }

    /// Create a rope from already-normalized text.
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        Self {
            rope: Rope::from_str(s),
        }
    }

    /// Get the number of characters.
    #[must_use]
    pub fn len_chars(&self) -> usize {
        self.rope.len_chars()
    }

    /// Get the number of lines. Never zero.
    #[must_use]
    pub fn len_lines(&self) -> usize {
        self.rope.len_lines()
    }

    /// Get a line by index, including its trailing LF if any.
    #[must_use]
    pub fn line(&self, idx: usize) -> Option<RopeSlice<'_>> {
        self.rope.get_line(idx)
    }

    /// Length of a line in characters, excluding the LF.
    #[must_use]
    pub fn line_len(&self, idx: usize) -> usize {
        self.line(idx).map_or(0, |line| {
            let len = line.len_chars();
            if len > 0 && line.char(len - 1) == '\n' {
                len - 1
            } else {
                len
            }
        })
    }

    /// Line content without the LF.
    #[must_use]
    pub fn line_text(&self, idx: usize) -> Option<String> {
        let line = self.line(idx)?;
        let len = self.line_len(idx);
        Some(line.slice(..len).to_string())
    }

    /// Iterate over all lines (each including its LF).
    pub fn lines(&self) -> impl Iterator<Item = RopeSlice<'_>> {
        self.rope.lines()
    }

    /// Insert text at a character position. Out-of-range positions are ignored.
    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if char_idx <= self.len_chars() {
            self.rope.insert(char_idx, text);
        }
    }

    /// Remove a range of characters, clamped to the rope.
    pub fn remove(&mut self, range: std::ops::Range<usize>) {
        let end = range.end.min(self.len_chars());
        let start = range.start.min(end);
        if start < end {
            self.rope.remove(start..end);
        }
    }

    /// Replace the entire contents.
    pub fn replace(&mut self, text: &str) {
        self.rope = Rope::from_str(text);
    }

    /// Convert to string.
    #[must_use]
    pub fn to_string(&self) -> String {
        self.rope.to_string()
    }

    /// Get the char index at the start of a line.
    #[must_use]
    pub fn line_to_char(&self, line_idx: usize) -> usize {
        if line_idx >= self.len_lines() {
            self.len_chars()
        } else {
            self.rope.line_to_char(line_idx)
        }
    }

    /// Char index of (line, column), clamped to the line.
    #[must_use]
    pub fn position_to_char(&self, line_idx: usize, column: usize) -> usize {
        self.line_to_char(line_idx) + column.min(self.line_len(line_idx))
    }
}

impl From<&str> for RopeWrapper {
    fn from(s: &str) -> Self {
        Self::from_str(&normalize_line_breaks(s))
    }
}
