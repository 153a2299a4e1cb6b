//! Tokenizer trait, carried line state and the table-driven highlighter.

use std::ops::Range;
use std::sync::Arc;

use super::language::LanguageDefinition;
use super::token::{ColorClass, Token};
use crate::text::normalize_line_breaks;

/// Lexical state carried from the end of one line to the start of the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LineState {
    #[default]
    Normal,
    /// Inside an unterminated multi-line comment.
    InComment,
}

impl LineState {
    #[must_use]
    pub const fn is_in_comment(self) -> bool {
        matches!(self, Self::InComment)
    }

    #[must_use]
    pub const fn from_in_comment(in_comment: bool) -> Self {
        if in_comment {
            Self::InComment
        } else {
            Self::Normal
        }
    }
}

/// Core tokenizer abstraction for syntax highlighting.
pub trait Tokenizer: Send + Sync {
    /// Human-readable name of this tokenizer.
    fn name(&self) -> &str;

    /// Tokenize a single line given the state from the previous line.
    /// Returns: (tokens, state_at_end_of_line).
    fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState);

    /// Tokenize a whole document, one token list per line.
    fn tokenize(&self, text: &str) -> Vec<Vec<Token>> {
        let text = normalize_line_breaks(text);
        let mut state = LineState::Normal;
        text.split('\n')
            .map(|line| {
                let (tokens, next) = self.tokenize_line(line, state);
                state = next;
                tokens
            })
            .collect()
    }
}

/// Keywords are only recognized after one of these (or at a run edge).
const KEYWORD_BEFORE: &[char] = &[' ', '=', '.', ';', '!'];
/// Keywords are only recognized before one of these (or at a run edge).
const KEYWORD_AFTER: &[char] = &[' ', '(', '.', ';'];
/// Characters that end a namespace run.
const NAMESPACE_END: &[char] = &[' ', '\t', '(', ';', '='];
/// Always classified as reserved, ahead of the reserved word table.
const SELF_KEYWORD: &str = "this";

/// Table-driven highlighter for one [`LanguageDefinition`].
///
/// Each run of unclassified text is split by the first rule that applies:
/// comments, then quotes, then keywords by category priority, then the
/// namespace marker, then numbers; whatever is left is plain text. Runs to
/// the left of a split are classified before runs to the right, so the
/// comment state flips in document order.
#[derive(Clone, Debug)]
pub struct SyntaxHighlighter {
    language: Arc<LanguageDefinition>,
}

impl SyntaxHighlighter {
    #[must_use]
    pub fn new(language: Arc<LanguageDefinition>) -> Self {
        Self { language }
    }

    #[must_use]
    pub fn language(&self) -> &Arc<LanguageDefinition> {
        &self.language
    }
}

impl From<LanguageDefinition> for SyntaxHighlighter {
    fn from(language: LanguageDefinition) -> Self {
        Self::new(Arc::new(language))
    }
}

impl Tokenizer for SyntaxHighlighter {
    fn name(&self) -> &str {
        &self.language.name
    }

    fn tokenize_line(&self, line: &str, state: LineState) -> (Vec<Token>, LineState) {
        let mut scanner = LineScanner {
            line,
            language: self.language.as_ref(),
            in_comment: state.is_in_comment(),
            work: vec![Work::Scan(0..line.len())],
            runs: Vec::new(),
        };
        scanner.run();
        let state = LineState::from_in_comment(scanner.in_comment);
        (scanner.into_tokens(), state)
    }
}

enum Work {
    Scan(Range<usize>),
    Emit(ColorClass, Range<usize>),
    EnterComment,
}

enum CommentStart {
    Line(usize),
    Block(usize),
}

struct LineScanner<'a> {
    line: &'a str,
    language: &'a LanguageDefinition,
    in_comment: bool,
    // Popped from the back; pushed right-to-left.
    work: Vec<Work>,
    // Byte ranges in document order.
    runs: Vec<(ColorClass, Range<usize>)>,
}

impl LineScanner<'_> {
    fn run(&mut self) {
        while let Some(item) = self.work.pop() {
            match item {
                Work::Scan(range) => self.scan(range),
                Work::Emit(class, range) => {
                    if !range.is_empty() {
                        self.runs.push((class, range));
                    }
                }
                Work::EnterComment => self.in_comment = true,
            }
        }
    }

    /// Queue `before`, then the classified `middle`, then `after`.
    fn split(
        &mut self,
        before: Range<usize>,
        class: ColorClass,
        middle: Range<usize>,
        after: Range<usize>,
    ) {
        self.work.push(Work::Scan(after));
        self.work.push(Work::Emit(class, middle));
        self.work.push(Work::Scan(before));
    }

    fn scan(&mut self, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        let line = self.line;
        let text = &line[range.clone()];
        let base = range.start;
        let end = range.end;

        if self.in_comment {
            let close = self
                .language
                .multi_line_comment
                .as_ref()
                .map(|markers| markers.close.as_str())
                .filter(|close| !close.is_empty());
            match close.and_then(|close| text.find(close).map(|i| i + close.len())) {
                Some(close_end) => {
                    self.in_comment = false;
                    self.work.push(Work::Scan(base + close_end..end));
                    self.work.push(Work::Emit(ColorClass::Comment, base..base + close_end));
                }
                None => self.work.push(Work::Emit(ColorClass::Comment, range)),
            }
            return;
        }

        let quote = first_quote(text);
        if let Some(comment) = self.find_comment(text) {
            let index = match comment {
                CommentStart::Line(i) | CommentStart::Block(i) => i,
            };
            if quote.is_none_or(|(q, _)| index < q) {
                self.split_comment(text, base, end, comment);
                return;
            }
        }

        if let Some((q, ch)) = quote {
            let close = closing_quote(text, q, ch).unwrap_or(text.len());
            self.split(
                base..base + q,
                ColorClass::StringLiteral,
                base + q..base + close,
                base + close..end,
            );
            return;
        }

        if let Some((i, len, class)) = self.find_keyword(text) {
            self.split(
                base..base + i,
                class,
                base + i..base + i + len,
                base + i + len..end,
            );
            return;
        }

        if let Some((i, run_end)) = self.find_namespace(text) {
            self.split(
                base..base + i,
                ColorClass::NamespaceMarker,
                base + i..base + run_end,
                base + run_end..end,
            );
            return;
        }

        if let Some(i) = find_numeric(text) {
            self.split(
                base..base + i,
                ColorClass::NumericLiteral,
                base + i..base + i + 1,
                base + i + 1..end,
            );
            return;
        }

        self.work.push(Work::Emit(ColorClass::PlainText, range));
    }

    fn find_comment(&self, text: &str) -> Option<CommentStart> {
        let line = Some(self.language.line_comment.as_str())
            .filter(|marker| !marker.is_empty())
            .and_then(|marker| text.find(marker));
        let block = self
            .language
            .multi_line_comment
            .as_ref()
            .filter(|markers| !markers.open.is_empty())
            .and_then(|markers| text.find(&markers.open));
        match (line, block) {
            (Some(l), Some(b)) if b < l => Some(CommentStart::Block(b)),
            (Some(l), _) => Some(CommentStart::Line(l)),
            (None, Some(b)) => Some(CommentStart::Block(b)),
            (None, None) => None,
        }
    }

    fn split_comment(&mut self, text: &str, base: usize, end: usize, comment: CommentStart) {
        match comment {
            CommentStart::Line(i) => {
                self.work.push(Work::Emit(ColorClass::Comment, base + i..end));
                self.work.push(Work::Scan(base..base + i));
            }
            CommentStart::Block(i) => {
                let Some(markers) = self.language.multi_line_comment.as_ref() else {
                    return;
                };
                let body = i + markers.open.len();
                let close = Some(markers.close.as_str())
                    .filter(|close| !close.is_empty())
                    .and_then(|close| text[body..].find(close).map(|c| body + c + close.len()));
                match close {
                    Some(close_end) => {
                        self.split(
                            base..base + i,
                            ColorClass::Comment,
                            base + i..base + close_end,
                            base + close_end..end,
                        );
                    }
                    None => {
                        self.work.push(Work::EnterComment);
                        self.work.push(Work::Emit(ColorClass::Comment, base + i..end));
                        self.work.push(Work::Scan(base..base + i));
                    }
                }
            }
        }
    }

    /// First match by category priority: `this`, reserved, builtins, then
    /// unbounded globals. Within a category the first table entry that
    /// occurs (and passes the boundary check) wins.
    fn find_keyword(&self, text: &str) -> Option<(usize, usize, ColorClass)> {
        let bounded_match = |word: &str| {
            if word.is_empty() {
                return None;
            }
            text.find(word)
                .filter(|&i| is_keyword_bounded(text, i, word.len()))
                .map(|i| (i, word.len()))
        };

        if let Some((i, len)) = bounded_match(SELF_KEYWORD) {
            return Some((i, len, ColorClass::Reserved));
        }
        let lang = self.language;
        for (words, class) in [
            (&lang.reserved, ColorClass::Reserved),
            (&lang.builtins, ColorClass::Builtin),
        ] {
            if let Some((i, len)) = words.iter().find_map(|word| bounded_match(word.as_str())) {
                return Some((i, len, class));
            }
        }
        lang.global_vars
            .iter()
            .filter(|word| !word.is_empty())
            .find_map(|word| text.find(word.as_str()).map(|i| (i, word.len())))
            .map(|(i, len)| (i, len, ColorClass::GlobalVar))
    }

    /// Start and end of the namespace run, extended up to the next
    /// terminator.
    fn find_namespace(&self, text: &str) -> Option<(usize, usize)> {
        let marker = self
            .language
            .namespace_marker
            .as_deref()
            .filter(|marker| !marker.is_empty())?;
        let start = text.find(marker)?;
        let after = start + marker.len();
        let run_end = text[after..]
            .find(NAMESPACE_END)
            .map_or(text.len(), |i| after + i);
        Some((start, run_end))
    }

    /// Convert byte runs to character-column tokens, merging neighbors of
    /// the same class.
    fn into_tokens(self) -> Vec<Token> {
        let mut tokens: Vec<Token> = Vec::with_capacity(self.runs.len());
        let mut byte = 0;
        let mut column = 0;
        for (class, range) in self.runs {
            column += self.line[byte..range.start].chars().count();
            let start = column;
            column += self.line[range.clone()].chars().count();
            byte = range.end;
            match tokens.last_mut() {
                Some(last) if last.class == class && last.end == start => last.end = column,
                _ => tokens.push(Token::new(class, start, column)),
            }
        }
        tokens
    }
}

fn is_keyword_bounded(text: &str, start: usize, len: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[start + len..].chars().next();
    before.is_none_or(|c| KEYWORD_BEFORE.contains(&c))
        && after.is_none_or(|c| KEYWORD_AFTER.contains(&c))
}

/// Earliest `"` or `'`.
fn first_quote(text: &str) -> Option<(usize, char)> {
    text.char_indices().find(|&(_, c)| c == '"' || c == '\'')
}

/// Byte index just past the quote closing the one at `open`. A quote
/// directly preceded by a backslash does not close.
fn closing_quote(text: &str, open: usize, quote: char) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut from = open + 1;
    loop {
        let rel = text[from..].find(quote)?;
        let at = from + rel;
        if rel > 0 && bytes[at - 1] == b'\\' {
            from = at + 1;
            continue;
        }
        return Some(at + 1);
    }
}

/// Start of the first signed or unsigned integer/decimal literal.
fn find_numeric(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let is_digit = |j: usize| bytes.get(j).is_some_and(u8::is_ascii_digit);
    let starts_body = |j: usize| is_digit(j) || (bytes.get(j) == Some(&b'.') && is_digit(j + 1));
    (0..bytes.len())
        .find(|&i| (matches!(bytes[i], b'-' | b'+') && starts_body(i + 1)) || starts_body(i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn js() -> SyntaxHighlighter {
        SyntaxHighlighter::from(LanguageDefinition::javascript())
    }

    fn classes(line: &str, state: LineState) -> (Vec<(ColorClass, String)>, LineState) {
        let (tokens, state) = js().tokenize_line(line, state);
        (
            tokens.iter().map(|t| (t.class, t.text(line))).collect(),
            state,
        )
    }

    #[test]
    fn test_line_state_helpers() {
        assert!(LineState::InComment.is_in_comment());
        assert_eq!(LineState::from_in_comment(false), LineState::Normal);
    }

    #[test]
    fn test_closing_quote_skips_escapes() {
        assert_eq!(closing_quote(r#""a\"b" x"#, 0, '"'), Some(6));
        assert_eq!(closing_quote(r#"'abc"#, 0, '\''), None);
        assert_eq!(closing_quote(r#""""#, 0, '"'), Some(2));
    }

    #[test]
    fn test_find_numeric() {
        assert_eq!(find_numeric("abc"), None);
        assert_eq!(find_numeric("x = 42"), Some(4));
        assert_eq!(find_numeric("a-1"), Some(1));
        assert_eq!(find_numeric("a.5"), Some(1));
        assert_eq!(find_numeric("a. 5"), Some(3));
        assert_eq!(find_numeric("x-y"), None);
    }

    #[test]
    fn test_keyword_boundaries() {
        assert!(is_keyword_bounded("this", 0, 4));
        assert!(is_keyword_bounded("x=this.y", 2, 4));
        assert!(!is_keyword_bounded("athis", 1, 4));
        assert!(!is_keyword_bounded("this,", 0, 4));
    }

    #[test]
    fn test_empty_line() {
        assert_eq!(classes("", LineState::Normal), (vec![], LineState::Normal));
        assert_eq!(classes("", LineState::InComment), (vec![], LineState::InComment));
    }

    #[test]
    fn test_comment_continuation() {
        let (tokens, state) = classes("a /* b", LineState::Normal);
        assert_eq!(state, LineState::InComment);
        assert_eq!(tokens.last().unwrap(), &(ColorClass::Comment, "/* b".to_string()));

        let (tokens, state) = classes("c */ x", LineState::InComment);
        assert_eq!(state, LineState::Normal);
        assert_eq!(tokens[0], (ColorClass::Comment, "c */".to_string()));
        assert_eq!(tokens[1], (ColorClass::PlainText, " x".to_string()));
    }

    #[test]
    fn test_block_comment_closed_on_same_line() {
        let (tokens, state) = classes("/* a */ var", LineState::Normal);
        assert_eq!(state, LineState::Normal);
        assert_eq!(
            tokens,
            vec![
                (ColorClass::Comment, "/* a */".to_string()),
                (ColorClass::PlainText, " ".to_string()),
                (ColorClass::Reserved, "var".to_string()),
            ]
        );
    }

    #[test]
    fn test_adjacent_digits_merge() {
        let (tokens, _) = classes("123", LineState::Normal);
        assert_eq!(tokens, vec![(ColorClass::NumericLiteral, "123".to_string())]);
    }

    #[test]
    fn test_tokenize_document_carries_state() {
        let lines = js().tokenize("/* one\ntwo */ 3\nthree");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1][0].class, ColorClass::Comment);
        assert_eq!(lines[1].last().unwrap().class, ColorClass::NumericLiteral);
        assert!(lines[2].iter().all(|t| t.class == ColorClass::PlainText));
    }
}
