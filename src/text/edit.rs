//! Editing operations over a highlighted buffer.
//!
//! [`EditBuffer`] owns the text, the cursor and the selection and applies
//! every edit to all three at once. Invalid cursor or selection state is
//! clamped before use, so none of the operations can fail.
//!
//! # Example
//!
//! ```
//! use textcore::text::{EditBuffer, Position};
//!
//! let mut edit = EditBuffer::with_text("Hello\nWorld");
//! edit.set_cursor(Position::new(1, 0));
//! edit.backspace(None);
//! assert_eq!(edit.text(), "HelloWorld");
//! assert_eq!(edit.cursor(), Position::new(0, 5));
//! ```

use crate::config::EditFlags;
use crate::highlight::HighlightedBuffer;
use crate::text::buffer::TextBuffer;
use crate::text::cursor::{Direction, Position, leading_spaces};
use crate::text::rope::normalize_line_breaks;
use crate::text::selection::{Selection, WORD_BOUNDARY_CHARS};

/// Text, cursor and selection edited as a unit.
#[derive(Debug)]
pub struct EditBuffer {
    highlighted: HighlightedBuffer,
    cursor: Position,
    selection: Selection,
    flags: EditFlags,
}

impl Default for EditBuffer {
    fn default() -> Self {
        Self {
            highlighted: HighlightedBuffer::default(),
            cursor: Position::default(),
            selection: Selection::new(),
            flags: EditFlags::STRIP_LEADING_SPACES_ON_INSERT,
        }
    }
}

impl EditBuffer {
    /// Create an empty buffer with default flags.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text`, cursor at the origin.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let mut edit = Self::new();
        edit.set_text(text);
        edit
    }

    /// Builder: editing flags.
    #[must_use]
    pub fn with_flags(mut self, flags: EditFlags) -> Self {
        self.flags = flags;
        self
    }

    #[must_use]
    pub fn flags(&self) -> EditFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: EditFlags) {
        self.flags = flags;
    }

    /// Replace the whole text without marking it changed.
    ///
    /// The cursor is clamped into the new text and the selection dropped.
    pub fn set_text<'a>(&mut self, text: impl Into<Option<&'a str>>) {
        self.highlighted.load(text);
        self.cursor.clamp_to(self.highlighted.buffer());
        self.selection.invalidate();
    }

    /// The whole text joined with LF.
    #[must_use]
    pub fn text(&self) -> String {
        self.buffer().serialize()
    }

    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        self.highlighted.buffer()
    }

    #[must_use]
    pub fn highlighted_buffer(&self) -> &HighlightedBuffer {
        &self.highlighted
    }

    pub fn highlighted_buffer_mut(&mut self) -> &mut HighlightedBuffer {
        &mut self.highlighted
    }

    #[must_use]
    pub fn cursor(&self) -> Position {
        self.cursor
    }

    /// Move the cursor to `pos`, clamped into the buffer.
    pub fn set_cursor(&mut self, pos: Position) {
        self.cursor = pos.clamped(self.buffer());
    }

    #[must_use]
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Whether the text changed since the last commit.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        self.buffer().is_changed()
    }

    /// Clear the changed flag, returning whether it was set.
    pub fn take_changed(&mut self) -> bool {
        self.highlighted.buffer_mut().take_changed()
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Step or jump left/right. Drops the selection.
    pub fn move_horizontal(&mut self, direction: Direction, jump: bool) {
        let indent_aware = self.flags.contains(EditFlags::INDENT_AWARE_NAVIGATION);
        self.cursor
            .move_horizontal(self.highlighted.buffer(), direction, jump, indent_aware);
        self.selection.invalidate();
    }

    /// Move `delta` lines. Drops the selection.
    pub fn move_vertical(&mut self, delta: isize) {
        self.cursor.move_vertical(self.highlighted.buffer(), delta);
        self.selection.invalidate();
    }

    /// Move one page of `visible_lines`. Drops the selection.
    pub fn move_page(&mut self, direction: Direction, visible_lines: usize) {
        self.cursor
            .move_page(self.highlighted.buffer(), direction, visible_lines);
        self.selection.invalidate();
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Start a selection gesture at `pos` and put the cursor there.
    pub fn begin_selection(&mut self, pos: Position) {
        self.set_cursor(pos);
        self.selection.begin(self.cursor);
    }

    /// Extend the current gesture to `pos`, moving the cursor with it.
    pub fn extend_selection(&mut self, pos: Position) {
        self.set_cursor(pos);
        self.selection.extend_to(self.cursor);
    }

    /// Select everything; the cursor goes to the end.
    pub fn select_all(&mut self) {
        self.selection.select_all(self.highlighted.buffer());
        self.cursor = self.selection.focus();
    }

    /// Select the word at `pos` (or its line). Returns whether anything was
    /// selected.
    pub fn select_word_at(&mut self, pos: Position) -> bool {
        let selected =
            self.selection
                .select_word(self.highlighted.buffer(), pos, WORD_BOUNDARY_CHARS);
        if selected {
            self.cursor = self.selection.focus();
        }
        selected
    }

    /// Select the whole of `line`.
    pub fn select_line(&mut self, line: usize) -> bool {
        let selected = self.selection.select_line(self.highlighted.buffer(), line);
        if selected {
            self.cursor = self.selection.focus();
        }
        selected
    }

    pub fn clear_selection(&mut self) {
        self.selection.invalidate();
    }

    /// Content of the selected span joined with LF, without a trailing LF.
    #[must_use]
    pub fn selected_text(&self) -> Option<String> {
        let buffer = self.buffer();
        let (start, end) = self.selection.range()?;
        let (start, end) = (start.clamped(buffer), end.clamped(buffer));
        if start >= end {
            return None;
        }
        if start.line == end.line {
            let line = buffer.line_or_empty(start.line);
            return Some(char_slice(&line, start.column, end.column).to_string());
        }
        let mut parts = Vec::with_capacity(end.line - start.line + 1);
        let first = buffer.line_or_empty(start.line);
        parts.push(split_at_column(&first, start.column).1.to_string());
        parts.extend((start.line + 1..end.line).map(|idx| buffer.line_or_empty(idx)));
        let last = buffer.line_or_empty(end.line);
        parts.push(split_at_column(&last, end.column).0.to_string());
        Some(parts.join("\n"))
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Remove the selected span and put the cursor at its start.
    ///
    /// Returns false (and changes nothing but the selection) when no valid
    /// selection exists.
    pub fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.selection.range() else {
            return false;
        };
        self.selection.invalidate();
        let buffer = self.highlighted.buffer();
        let (start, end) = (start.clamped(buffer), end.clamped(buffer));
        if start >= end {
            return false;
        }

        let first = buffer.line_or_empty(start.line);
        let last = buffer.line_or_empty(end.line);
        let mut merged = split_at_column(&first, start.column).0.to_string();
        merged.push_str(split_at_column(&last, end.column).1);

        let text = self.highlighted.buffer_mut();
        text.replace_line(start.line, &merged);
        text.remove_lines(start.line + 1..end.line + 1);
        self.cursor = start;
        if end.line > start.line {
            self.lines_shifted(start.line);
        } else {
            self.touched(start.line);
        }
        true
    }

    /// Insert text that may span lines (paste, bulk insert).
    ///
    /// With `STRIP_LEADING_SPACES_ON_INSERT` the leading spaces of the first
    /// segment are dropped. The cursor ends after the last inserted segment.
    pub fn insert_text(&mut self, text: &str) {
        let normalized = normalize_line_breaks(text);
        let mut segments: Vec<&str> = normalized.split('\n').collect();
        if self.flags.contains(EditFlags::STRIP_LEADING_SPACES_ON_INSERT) {
            segments[0] = segments[0].trim_start_matches(' ');
        }
        if segments.len() == 1 && segments[0].is_empty() {
            return;
        }

        self.cursor.clamp_to(self.highlighted.buffer());
        let Position { line, column } = self.cursor;
        let current = self.buffer().line_or_empty(line);
        let (prefix, suffix) = split_at_column(&current, column);

        let buffer = self.highlighted.buffer_mut();
        match segments.as_slice() {
            [only] => {
                buffer.replace_line(line, &format!("{prefix}{only}{suffix}"));
                self.cursor.column = column + only.chars().count();
                self.touched(line);
            }
            [first, middle @ .., last] => {
                buffer.replace_line(line, &format!("{prefix}{first}"));
                for (offset, segment) in middle.iter().enumerate() {
                    buffer.insert_line_after(line + offset, segment);
                }
                buffer.insert_line_after(line + middle.len(), &format!("{last}{suffix}"));
                self.cursor = Position::new(line + middle.len() + 1, last.chars().count());
                self.lines_shifted(line);
            }
            [] => return,
        }
        self.selection.invalidate();
    }

    /// Insert typed text within the current line. Line breaks are dropped.
    pub fn type_character(&mut self, text: &str) {
        let typed: String = text.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
        if typed.is_empty() {
            return;
        }
        self.cursor.clamp_to(self.highlighted.buffer());
        let Position { line, column } = self.cursor;
        let current = self.buffer().line_or_empty(line);
        let (prefix, suffix) = split_at_column(&current, column);
        self.highlighted
            .buffer_mut()
            .replace_line(line, &format!("{prefix}{typed}{suffix}"));
        self.cursor.column = column + typed.chars().count();
        self.selection.invalidate();
        self.touched(line);
    }

    /// Delete backwards from the cursor.
    ///
    /// A valid selection is deleted instead. With `indent_width`, a run of
    /// spaces back to the previous indent stop goes in one step. At column 0
    /// the line is merged onto the previous one. Returns whether anything
    /// changed.
    pub fn backspace(&mut self, indent_width: Option<usize>) -> bool {
        if self.selection.is_valid() {
            return self.delete_selection();
        }
        self.cursor.clamp_to(self.highlighted.buffer());
        let Position { line, column } = self.cursor;

        if column > 0 {
            let chars: Vec<char> = self.buffer().line_or_empty(line).chars().collect();
            let mut count = 1;
            if let Some(width) = indent_width.filter(|&w| w > 0) {
                let run = match column % width {
                    0 => width,
                    rem => rem,
                };
                if chars[column - run..column].iter().all(|&c| c == ' ') {
                    count = run;
                }
            }
            let updated: String = chars[..column - count]
                .iter()
                .chain(&chars[column..])
                .collect();
            self.highlighted.buffer_mut().replace_line(line, &updated);
            self.cursor.column = column - count;
            self.touched(line);
            true
        } else if line > 0 {
            let previous = self.buffer().line_or_empty(line - 1);
            let current = self.buffer().line_or_empty(line);
            let joined_at = previous.chars().count();
            let buffer = self.highlighted.buffer_mut();
            buffer.replace_line(line - 1, &format!("{previous}{current}"));
            buffer.remove_line(line);
            self.cursor = Position::new(line - 1, joined_at);
            self.lines_shifted(line - 1);
            true
        } else {
            false
        }
    }

    /// Split the current line at the cursor.
    ///
    /// `mirror_indent` repeats the original line's leading spaces on the new
    /// line; with `extra_indent_on_open_brace` as well, a line ending in `{`
    /// adds `indent_width` more. A valid selection is deleted first.
    pub fn newline(
        &mut self,
        mirror_indent: bool,
        extra_indent_on_open_brace: bool,
        indent_width: Option<usize>,
    ) {
        self.delete_selection();
        self.cursor.clamp_to(self.highlighted.buffer());
        let Position { line, column } = self.cursor;
        let current = self.buffer().line_or_empty(line);
        let (prefix, suffix) = split_at_column(&current, column);

        let mut indent = 0;
        if mirror_indent {
            indent = leading_spaces(&current);
            if extra_indent_on_open_brace && current.trim_end().ends_with('{') {
                indent += indent_width.unwrap_or(0);
            }
        }

        let next = format!("{}{suffix}", " ".repeat(indent));
        let buffer = self.highlighted.buffer_mut();
        buffer.replace_line(line, prefix);
        buffer.insert_line_after(line, &next);
        self.cursor = Position::new(line + 1, indent);
        self.selection.invalidate();
        self.lines_shifted(line);
    }

    /// Insert `indent_width` spaces at the cursor.
    pub fn tab(&mut self, indent_width: usize) {
        self.type_character(&" ".repeat(indent_width));
    }

    fn touched(&mut self, line: usize) {
        self.highlighted.buffer_mut().mark_changed();
        self.highlighted.mark_dirty(line);
    }

    fn lines_shifted(&mut self, from: usize) {
        self.highlighted.buffer_mut().mark_changed();
        self.highlighted.mark_dirty_from(from);
    }
}

/// Split `line` at a character column. Columns past the end split at the end.
#[must_use]
pub fn split_at_column(line: &str, column: usize) -> (&str, &str) {
    let at = line
        .char_indices()
        .nth(column)
        .map_or(line.len(), |(idx, _)| idx);
    line.split_at(at)
}

fn char_slice(line: &str, from: usize, to: usize) -> &str {
    let (_, rest) = split_at_column(line, from);
    split_at_column(rest, to.saturating_sub(from)).0
}
