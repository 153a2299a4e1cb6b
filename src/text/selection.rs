//! Anchor/focus selection with a derived sorted span.

use crate::text::buffer::TextBuffer;
use crate::text::cursor::Position;
use std::ops::Range;

/// Characters that end a word for double-click selection.
pub const WORD_BOUNDARY_CHARS: &[char] = &[
    ' ', '.', ',', ':', ';', '=', '(', ')', '[', ']', '{', '}', '"', '\'',
];

/// A selection between the gesture's anchor and its moving focus.
///
/// `start`/`end` hold the endpoints in document order. A selection is valid
/// only while anchor and focus differ; an invalid selection has no range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    anchor: Position,
    focus: Position,
    start: Position,
    end: Position,
    valid: bool,
}

impl Selection {
    /// Create an empty (invalid) selection at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a gesture at `pos`. The selection is empty until extended.
    pub fn begin(&mut self, pos: Position) {
        self.anchor = pos;
        self.focus = pos;
        self.start = pos;
        self.end = pos;
        self.valid = false;
    }

    /// Move the focus to `pos`.
    pub fn extend_to(&mut self, pos: Position) {
        self.focus = pos;
        self.valid = self.anchor != pos;
        self.sort();
    }

    /// Select from `anchor` to `focus` in one step.
    pub fn set(&mut self, anchor: Position, focus: Position) {
        self.begin(anchor);
        self.extend_to(focus);
    }

    /// Select the whole document.
    pub fn select_all(&mut self, buffer: &TextBuffer) {
        let last = buffer.last_line();
        self.set(Position::new(0, 0), Position::new(last, buffer.line_len(last)));
    }

    /// Select the word around `pos`, or the whole line if `pos` touches no
    /// word characters. Returns whether anything was selected.
    pub fn select_word(&mut self, buffer: &TextBuffer, pos: Position, boundary: &[char]) -> bool {
        let pos = pos.clamped(buffer);
        let chars: Vec<char> = buffer.line_or_empty(pos.line).chars().collect();
        let is_boundary = |c: char| boundary.contains(&c);

        let mut left = pos.column;
        while left > 0 && !is_boundary(chars[left - 1]) {
            left -= 1;
        }
        let mut right = pos.column;
        while right < chars.len() && !is_boundary(chars[right]) {
            right += 1;
        }

        if left == right {
            return self.select_line(buffer, pos.line);
        }
        self.set(Position::new(pos.line, left), Position::new(pos.line, right));
        true
    }

    /// Select the whole of `line`. Empty lines select nothing.
    pub fn select_line(&mut self, buffer: &TextBuffer, line: usize) -> bool {
        let line = line.min(buffer.last_line());
        self.set(Position::new(line, 0), Position::new(line, buffer.line_len(line)));
        self.valid
    }

    /// Drop the selection.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    #[must_use]
    pub fn anchor(&self) -> Position {
        self.anchor
    }

    #[must_use]
    pub fn focus(&self) -> Position {
        self.focus
    }

    /// Sorted `(start, end)` while the selection is valid.
    #[must_use]
    pub fn range(&self) -> Option<(Position, Position)> {
        self.valid.then_some((self.start, self.end))
    }

    /// Whether `pos` falls inside the selected span (end exclusive).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.range()
            .is_some_and(|(start, end)| start <= pos && pos < end)
    }

    /// Columns of `line` covered by the selection.
    ///
    /// A line strictly between the endpoints is covered from 0 to
    /// `line_len`; the first line runs from the start column to the line end
    /// and the last line from 0 to the end column.
    #[must_use]
    pub fn line_span(&self, line: usize, line_len: usize) -> Option<Range<usize>> {
        let (start, end) = self.range()?;
        if line < start.line || line > end.line {
            return None;
        }
        let from = if line == start.line { start.column } else { 0 };
        let to = if line == end.line { end.column } else { line_len };
        Some(from..to.max(from))
    }

    /// Pull both endpoints back inside `buffer`.
    pub fn clamp(&mut self, buffer: &TextBuffer) {
        self.anchor.clamp_to(buffer);
        self.focus.clamp_to(buffer);
        self.valid = self.valid && self.anchor != self.focus;
        self.sort();
    }

    fn sort(&mut self) {
        if self.anchor <= self.focus {
            self.start = self.anchor;
            self.end = self.focus;
        } else {
            self.start = self.focus;
            self.end = self.anchor;
        }
    }
}
