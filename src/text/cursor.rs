//! Cursor positions and navigation.

use crate::text::buffer::TextBuffer;
use std::cmp::Ordering;

/// A (line, column) position in a [`TextBuffer`].
///
/// Columns count characters, and `column == line length` is the position
/// after the last character. Positions order lexicographically: line first,
/// then column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Pull the position back inside `buffer`.
    ///
    /// A line past the end moves to the last line; a column past the end of
    /// its line moves to the line end.
    pub fn clamp_to(&mut self, buffer: &TextBuffer) {
        if self.line >= buffer.line_count() {
            self.line = buffer.last_line();
        }
        let len = buffer.line_len(self.line);
        if self.column > len {
            self.column = len;
        }
    }

    /// Clamped copy of this position.
    #[must_use]
    pub fn clamped(mut self, buffer: &TextBuffer) -> Self {
        self.clamp_to(buffer);
        self
    }

    /// Whether this position lies inside `buffer`.
    #[must_use]
    pub fn is_within(&self, buffer: &TextBuffer) -> bool {
        self.line < buffer.line_count() && self.column <= buffer.line_len(self.line)
    }

    /// Move one step left or right, or jump to the line boundary.
    ///
    /// Single steps wrap across line ends. Jumping left with
    /// `indent_aware` first stops after the leading spaces; a second jump
    /// from there goes to column 0.
    pub fn move_horizontal(
        &mut self,
        buffer: &TextBuffer,
        direction: Direction,
        jump: bool,
        indent_aware: bool,
    ) {
        self.clamp_to(buffer);
        match (direction, jump) {
            (Direction::Backward, true) => {
                let old = self.column;
                let mut column = 0;
                if indent_aware {
                    column = leading_spaces(&buffer.line_or_empty(self.line));
                    if column != 0 && column == old {
                        column = 0;
                    }
                }
                self.column = column;
            }
            (Direction::Forward, true) => {
                self.column = buffer.line_len(self.line);
            }
            (Direction::Backward, false) => {
                if self.column > 0 {
                    self.column -= 1;
                } else if self.line > 0 {
                    self.line -= 1;
                    self.column = buffer.line_len(self.line);
                }
            }
            (Direction::Forward, false) => {
                if self.column < buffer.line_len(self.line) {
                    self.column += 1;
                } else if self.line < buffer.last_line() {
                    self.line += 1;
                    self.column = 0;
                }
            }
        }
    }

    /// Move `delta` lines up (negative) or down, keeping the column where
    /// the destination line allows it.
    pub fn move_vertical(&mut self, buffer: &TextBuffer, delta: isize) {
        self.clamp_to(buffer);
        let target = self.line.saturating_add_signed(delta);
        self.line = target.min(buffer.last_line());
        self.clamp_to(buffer);
    }

    /// Move one page of `visible_lines` lines in `direction`.
    pub fn move_page(&mut self, buffer: &TextBuffer, direction: Direction, visible_lines: usize) {
        let page = isize::try_from(visible_lines.max(1)).unwrap_or(isize::MAX);
        let delta = match direction {
            Direction::Backward => -page,
            Direction::Forward => page,
        };
        self.move_vertical(buffer, delta);
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line
            .cmp(&other.line)
            .then(self.column.cmp(&other.column))
    }
}

impl From<(usize, usize)> for Position {
    fn from((line, column): (usize, usize)) -> Self {
        Self::new(line, column)
    }
}

/// Direction of travel for navigation and search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Backward,
    #[default]
    Forward,
}

/// Number of plain spaces at the start of `line`.
#[must_use]
pub fn leading_spaces(line: &str) -> usize {
    line.chars().take_while(|&c| c == ' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::with_text(text)
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        assert!(Position::new(0, 9) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(
            Position::new(1, 1).cmp(&Position::new(1, 1)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_clamp_line_and_column() {
        let buf = buffer("abc\nde");
        let mut pos = Position::new(7, 9);
        pos.clamp_to(&buf);
        assert_eq!(pos, Position::new(1, 2));

        let mut pos = Position::new(0, 10);
        pos.clamp_to(&buf);
        assert_eq!(pos, Position::new(0, 3));
        assert!(pos.is_within(&buf));
    }

    #[test]
    fn test_left_wraps_to_previous_line_end() {
        let buf = buffer("abc\nde");
        let mut pos = Position::new(1, 0);
        pos.move_horizontal(&buf, Direction::Backward, false, false);
        assert_eq!(pos, Position::new(0, 3));

        let mut pos = Position::new(0, 0);
        pos.move_horizontal(&buf, Direction::Backward, false, false);
        assert_eq!(pos, Position::new(0, 0));
    }

    #[test]
    fn test_right_wraps_to_next_line_start() {
        let buf = buffer("abc\nde");
        let mut pos = Position::new(0, 3);
        pos.move_horizontal(&buf, Direction::Forward, false, false);
        assert_eq!(pos, Position::new(1, 0));

        let mut pos = Position::new(1, 2);
        pos.move_horizontal(&buf, Direction::Forward, false, false);
        assert_eq!(pos, Position::new(1, 2));
    }

    #[test]
    fn test_jump_left_toggles_indent() {
        let buf = buffer("    let x");
        let mut pos = Position::new(0, 8);
        pos.move_horizontal(&buf, Direction::Backward, true, true);
        assert_eq!(pos.column, 4);
        pos.move_horizontal(&buf, Direction::Backward, true, true);
        assert_eq!(pos.column, 0);
        pos.move_horizontal(&buf, Direction::Backward, true, true);
        assert_eq!(pos.column, 4);
    }

    #[test]
    fn test_jump_left_without_indent_awareness() {
        let buf = buffer("    let x");
        let mut pos = Position::new(0, 8);
        pos.move_horizontal(&buf, Direction::Backward, true, false);
        assert_eq!(pos.column, 0);
    }

    #[test]
    fn test_jump_right_goes_to_line_end() {
        let buf = buffer("hello");
        let mut pos = Position::new(0, 1);
        pos.move_horizontal(&buf, Direction::Forward, true, false);
        assert_eq!(pos.column, 5);
    }

    #[test]
    fn test_vertical_clamps_column() {
        let buf = buffer("long line\nab\nanother");
        let mut pos = Position::new(0, 8);
        pos.move_vertical(&buf, 1);
        assert_eq!(pos, Position::new(1, 2));
        pos.move_vertical(&buf, -5);
        assert_eq!(pos, Position::new(0, 2));
        pos.move_vertical(&buf, 10);
        assert_eq!(pos.line, 2);
    }

    #[test]
    fn test_page_moves() {
        let buf = buffer(&"x\n".repeat(30));
        let mut pos = Position::new(0, 0);
        pos.move_page(&buf, Direction::Forward, 10);
        assert_eq!(pos.line, 10);
        pos.move_page(&buf, Direction::Forward, 100);
        assert_eq!(pos.line, 30);
        pos.move_page(&buf, Direction::Backward, 25);
        assert_eq!(pos.line, 5);
    }
}
