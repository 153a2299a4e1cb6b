//! Line-oriented document storage.
//!
//! [`TextBuffer`] is an ordered sequence of lines backed by a rope. It always
//! holds at least one line; an empty document is a single empty line.
//! Line terminators are normalized to LF on load and LF is the only
//! separator used when serializing.

use crate::text::rope::{RopeWrapper, normalize_line_breaks};
use std::ops::Range;

/// Ordered sequence of lines with a "changed since last commit" flag.
///
/// The structural operations (`replace_line`, `insert_line_after`,
/// `remove_line`) never fail. Out-of-range indices are clamped to the last
/// line, so callers that already validated their indices get exactly what
/// they asked for.
#[derive(Clone, Debug, Default)]
pub struct TextBuffer {
    rope: RopeWrapper,
    changed: bool,
    revision: u64,
}

impl TextBuffer {
    /// Create a buffer holding one empty line.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer from text, splitting on CR, LF or CRLF.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut buffer = Self::new();
        buffer.load(text);
        buffer
    }

    /// Replace all lines with `text`. `None` loads an empty document.
    ///
    /// Loading does not mark the buffer changed: it represents the value
    /// coming from outside, not a user edit.
    pub fn load<'a>(&mut self, text: impl Into<Option<&'a str>>) {
        let text = text.into().unwrap_or_default();
        self.rope.replace(&normalize_line_breaks(text));
        self.bump_revision();
    }

    /// Join all lines with LF.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.rope.to_string()
    }

    /// Number of lines. Always at least 1.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// Index of the last line.
    #[must_use]
    pub fn last_line(&self) -> usize {
        self.line_count() - 1
    }

    /// Content of line `idx` without its terminator.
    #[must_use]
    pub fn line(&self, idx: usize) -> Option<String> {
        self.rope.line_text(idx)
    }

    /// Content of line `idx`, or an empty string when out of range.
    #[must_use]
    pub fn line_or_empty(&self, idx: usize) -> String {
        self.line(idx).unwrap_or_default()
    }

    /// Length of line `idx` in characters; 0 when out of range.
    #[must_use]
    pub fn line_len(&self, idx: usize) -> usize {
        self.rope.line_len(idx)
    }

    /// Iterate over all lines without terminators.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.line_count()).map(|idx| self.line_or_empty(idx))
    }

    /// Replace the content of line `idx`.
    pub fn replace_line(&mut self, idx: usize, new_line: &str) {
        let idx = idx.min(self.last_line());
        let start = self.rope.line_to_char(idx);
        let end = start + self.rope.line_len(idx);
        self.rope.remove(start..end);
        self.rope.insert(start, &strip_line_breaks(new_line));
        self.bump_revision();
    }

    /// Insert a new line directly after line `idx`.
    pub fn insert_line_after(&mut self, idx: usize, new_line: &str) {
        let idx = idx.min(self.last_line());
        let at = self.rope.line_to_char(idx) + self.rope.line_len(idx);
        let mut text = String::with_capacity(new_line.len() + 1);
        text.push('\n');
        text.push_str(&strip_line_breaks(new_line));
        self.rope.insert(at, &text);
        self.bump_revision();
    }

    /// Remove line `idx`. Removing the only line leaves one empty line.
    pub fn remove_line(&mut self, idx: usize) {
        let idx = idx.min(self.last_line());
        self.remove_lines(idx..idx + 1);
    }

    /// Remove a range of whole lines. At least one (empty) line remains.
    pub fn remove_lines(&mut self, lines: Range<usize>) {
        let count = self.line_count();
        let end = lines.end.min(count);
        let start = lines.start.min(end);
        if start == end {
            return;
        }
        if start == 0 && end == count {
            self.rope.replace("");
        } else if end == count {
            // Take the separator in front of the first removed line with it.
            let from = self.rope.line_to_char(start) - 1;
            self.rope.remove(from..self.rope.len_chars());
        } else {
            let from = self.rope.line_to_char(start);
            let to = self.rope.line_to_char(end);
            self.rope.remove(from..to);
        }
        self.bump_revision();
    }

    /// Whether the content changed since the last commit.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Flag the content as changed by a user edit.
    pub fn mark_changed(&mut self) {
        self.changed = true;
    }

    /// Clear the changed flag, returning whether it was set.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Monotonic counter bumped by every structural mutation.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Access the underlying rope.
    #[must_use]
    pub fn rope(&self) -> &RopeWrapper {
        &self.rope
    }

    fn bump_revision(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

fn strip_line_breaks(line: &str) -> std::borrow::Cow<'_, str> {
    if line.contains(['\n', '\r']) {
        std::borrow::Cow::Owned(line.chars().filter(|c| !matches!(c, '\n' | '\r')).collect())
    } else {
        std::borrow::Cow::Borrowed(line)
    }
}
