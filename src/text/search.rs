//! Substring search with whole-document wraparound.

use crate::text::buffer::TextBuffer;
use crate::text::cursor::{Direction, Position};
use std::ops::Range;
use tracing::{debug, trace};

/// A search hit: where the term starts and how many characters it spans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchMatch {
    pub position: Position,
    pub len: usize,
}

impl SearchMatch {
    /// Position just past the match.
    #[must_use]
    pub fn end(&self) -> Position {
        Position::new(self.position.line, self.position.column + self.len)
    }
}

/// Find the next occurrence of `term` from `from`.
///
/// Forward search looks at columns after the cursor on its line, then at
/// each following line, wrapping from the last line to line 0. Backward
/// search looks at columns before the cursor, then at each previous line,
/// wrapping from line 0 to the last. The scan gives up once it wraps back to
/// the starting line. An empty term never matches.
#[must_use]
pub fn find_next(
    buffer: &TextBuffer,
    from: Position,
    term: &str,
    case_sensitive: bool,
    direction: Direction,
) -> Option<SearchMatch> {
    if term.is_empty() {
        return None;
    }
    let needle: Vec<char> = term.chars().collect();
    let from = from.clamped(buffer);
    let count = buffer.line_count();

    let hit = |line: usize, column: usize| SearchMatch {
        position: Position::new(line, column),
        len: needle.len(),
    };

    let start_chars: Vec<char> = buffer.line_or_empty(from.line).chars().collect();
    let first = match direction {
        Direction::Forward => find_in(&start_chars, &needle, case_sensitive, from.column + 1..),
        Direction::Backward => rfind_in(&start_chars, &needle, case_sensitive, from.column),
    };
    if let Some(column) = first {
        return Some(hit(from.line, column));
    }

    let mut line = from.line;
    loop {
        line = match direction {
            Direction::Forward => (line + 1) % count,
            Direction::Backward => line.checked_sub(1).unwrap_or(count - 1),
        };
        if line == from.line {
            debug!(term, "search found no match");
            return None;
        }
        if (direction == Direction::Forward && line == 0)
            || (direction == Direction::Backward && line == count - 1)
        {
            trace!(term, "search wrapped");
        }
        let chars: Vec<char> = buffer.line_or_empty(line).chars().collect();
        let column = match direction {
            Direction::Forward => find_in(&chars, &needle, case_sensitive, 0..),
            Direction::Backward => rfind_in(&chars, &needle, case_sensitive, chars.len()),
        };
        if let Some(column) = column {
            return Some(hit(line, column));
        }
    }
}

/// Character columns of the first occurrence of `term` in `line`.
#[must_use]
pub fn first_occurrence_in_line(line: &str, term: &str, case_sensitive: bool) -> Option<Range<usize>> {
    if term.is_empty() {
        return None;
    }
    let needle: Vec<char> = term.chars().collect();
    let chars: Vec<char> = line.chars().collect();
    find_in(&chars, &needle, case_sensitive, 0..).map(|start| start..start + needle.len())
}

fn chars_eq(a: char, b: char, case_sensitive: bool) -> bool {
    a == b || (!case_sensitive && a.to_lowercase().eq(b.to_lowercase()))
}

fn matches_at(hay: &[char], needle: &[char], case_sensitive: bool, at: usize) -> bool {
    hay.get(at..at + needle.len()).is_some_and(|window| {
        window
            .iter()
            .zip(needle)
            .all(|(&a, &b)| chars_eq(a, b, case_sensitive))
    })
}

/// Leftmost match starting at or after `from.start`.
fn find_in(
    hay: &[char],
    needle: &[char],
    case_sensitive: bool,
    from: std::ops::RangeFrom<usize>,
) -> Option<usize> {
    let last_start = hay.len().checked_sub(needle.len())?;
    (from.start..=last_start).find(|&at| matches_at(hay, needle, case_sensitive, at))
}

/// Rightmost match starting strictly before `before`.
fn rfind_in(hay: &[char], needle: &[char], case_sensitive: bool, before: usize) -> Option<usize> {
    let last_start = hay.len().checked_sub(needle.len())?;
    let limit = before.min(last_start + 1);
    (0..limit)
        .rev()
        .find(|&at| matches_at(hay, needle, case_sensitive, at))
}
