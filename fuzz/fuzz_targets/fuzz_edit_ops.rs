//! Fuzz target for editing operations.
//!
//! Replays arbitrary edit sequences; the cursor must stay inside the buffer
//! and no operation may panic.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use textcore::{Direction, EditBuffer, EditFlags, Position};

#[derive(Arbitrary, Debug)]
enum Op {
    Type(String),
    Insert(String),
    Backspace { indent_aware: bool },
    Newline { mirror: bool, brace: bool },
    Move { forward: bool, jump: bool },
    Vertical(i8),
    Cursor { line: u8, column: u8 },
    Select { line: u8, column: u8 },
    DeleteSelection,
    SelectWord,
    SelectAll,
}

#[derive(Arbitrary, Debug)]
struct Input {
    text: String,
    flags: u8,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let flags = EditFlags::from_bits_truncate(input.flags);
    let mut edit = EditBuffer::with_text(&input.text).with_flags(flags);
    for op in input.ops.into_iter().take(64) {
        match op {
            Op::Type(text) => edit.type_character(&text),
            Op::Insert(text) => edit.insert_text(&text),
            Op::Backspace { indent_aware } => {
                edit.backspace(indent_aware.then_some(4));
            }
            Op::Newline { mirror, brace } => edit.newline(mirror, brace, Some(4)),
            Op::Move { forward, jump } => {
                let direction = if forward { Direction::Forward } else { Direction::Backward };
                edit.move_horizontal(direction, jump);
            }
            Op::Vertical(delta) => edit.move_vertical(isize::from(delta)),
            Op::Cursor { line, column } => {
                edit.set_cursor(Position::new(line.into(), column.into()));
            }
            Op::Select { line, column } => {
                edit.extend_selection(Position::new(line.into(), column.into()));
            }
            Op::DeleteSelection => {
                edit.delete_selection();
            }
            Op::SelectWord => {
                edit.select_word_at(edit.cursor());
            }
            Op::SelectAll => edit.select_all(),
        }
        assert!(edit.cursor().is_within(edit.buffer()));
    }
    let _ = edit.selected_text();
});
