//! Fuzz target for the line tokenizer.
//!
//! Tokens must stay contiguous and cover the whole line for any input and
//! either comment state.

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::sync::OnceLock;
use textcore::highlight::{LanguageDefinition, LineState, SyntaxHighlighter, Tokenizer};

fn highlighters() -> &'static [SyntaxHighlighter; 2] {
    static CELL: OnceLock<[SyntaxHighlighter; 2]> = OnceLock::new();
    CELL.get_or_init(|| {
        [
            SyntaxHighlighter::from(LanguageDefinition::javascript()),
            SyntaxHighlighter::from(LanguageDefinition::raysl()),
        ]
    })
}

fuzz_target!(|data: (&str, bool)| {
    let (line, in_comment) = data;
    let line = line.replace(['\n', '\r'], " ");
    let len = line.chars().count();
    for highlighter in highlighters() {
        let (tokens, _) = highlighter.tokenize_line(&line, LineState::from_in_comment(in_comment));
        let mut end = 0;
        for token in &tokens {
            assert_eq!(token.start, end);
            assert!(token.start < token.end);
            end = token.end;
        }
        assert_eq!(end, len);
    }
});
