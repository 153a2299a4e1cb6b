use crate::highlight::language::LanguageDefinition;
use crate::highlight::palette::Palette;
use crate::highlight::token::Token;
use crate::highlight::tokenizer::{LineState, SyntaxHighlighter, Tokenizer};
use crate::text::TextBuffer;
use std::sync::Arc;
use tracing::trace;

/// Text buffer with cached per-line highlighting.
///
/// Wraps a [`TextBuffer`] and a tokenizer. Tokens and the comment state at
/// the end of each line are cached; edits mark their lines dirty and
/// [`update_highlighting`](Self::update_highlighting) rescans from the first
/// dirty line through at least the last one, then stops as soon as a line's
/// tokens and outgoing state come out unchanged.
pub struct HighlightedBuffer {
    buffer: TextBuffer,
    tokenizer: Option<Arc<dyn Tokenizer>>,
    palette: Palette,

    // Per-line token cache
    line_tokens: Vec<Vec<Token>>,
    line_states: Vec<Option<LineState>>, // State at END of each line; None until scanned

    // Stale line span, inclusive
    dirty: Option<(usize, usize)>,
}

impl HighlightedBuffer {
    /// Create a highlighted buffer with no tokenizer.
    #[must_use]
    pub fn new(buffer: TextBuffer) -> Self {
        let line_count = buffer.line_count();
        Self {
            buffer,
            tokenizer: None,
            palette: Palette::default(),
            line_tokens: vec![Vec::new(); line_count],
            line_states: vec![None; line_count],
            dirty: Some((0, usize::MAX)),
        }
    }

    /// Set the language (builder pattern).
    #[must_use]
    pub fn with_language(mut self, language: Arc<LanguageDefinition>) -> Self {
        self.set_language(Some(language));
        self
    }

    /// Highlight with a language definition's tables and palette.
    pub fn set_language(&mut self, language: Option<Arc<LanguageDefinition>>) {
        match language {
            Some(language) => {
                self.palette = language.palette.clone();
                self.set_tokenizer(Some(Arc::new(SyntaxHighlighter::new(language))));
            }
            None => {
                self.palette = Palette::default();
                self.set_tokenizer(None);
            }
        }
    }

    /// Set the tokenizer. Triggers a full re-highlight on next update.
    pub fn set_tokenizer(&mut self, tokenizer: Option<Arc<dyn Tokenizer>>) {
        self.tokenizer = tokenizer;
        for tokens in &mut self.line_tokens {
            tokens.clear();
        }
        self.line_states.fill(None);
        self.mark_all_dirty();
    }

    /// Returns true if a tokenizer is set.
    #[must_use]
    pub fn has_tokenizer(&self) -> bool {
        self.tokenizer.is_some()
    }

    /// Colors for the current language.
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Get the underlying text buffer.
    #[must_use]
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// Get mutable access to the underlying text buffer.
    ///
    /// Callers must follow edits with [`mark_dirty`](Self::mark_dirty), or
    /// [`mark_dirty_from`](Self::mark_dirty_from) when lines were inserted or
    /// removed.
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Mark a line stale. The next update rescans from the lowest marked
    /// line through the highest.
    pub fn mark_dirty(&mut self, line: usize) {
        self.dirty = Some(match self.dirty {
            Some((from, to)) => (from.min(line), to.max(line)),
            None => (line, line),
        });
    }

    /// Mark `line` and everything after it stale. Edits that insert or
    /// remove lines use this, since they shift every later line.
    pub fn mark_dirty_from(&mut self, line: usize) {
        let from = self.dirty.map_or(line, |(from, _)| from.min(line));
        self.dirty = Some((from, usize::MAX));
    }

    /// Mark every line stale.
    pub fn mark_all_dirty(&mut self) {
        self.mark_dirty_from(0);
    }

    /// First stale line, if any.
    #[must_use]
    pub fn dirty_from(&self) -> Option<usize> {
        self.dirty.map(|(from, _)| from)
    }

    /// Last stale line, if any.
    #[must_use]
    pub fn dirty_to(&self) -> Option<usize> {
        self.dirty.map(|(_, to)| to)
    }

    /// Replace the whole text and invalidate every line.
    pub fn load<'a>(&mut self, text: impl Into<Option<&'a str>>) {
        self.buffer.load(text);
        let line_count = self.buffer.line_count();
        self.line_tokens.clear();
        self.line_tokens.resize(line_count, Vec::new());
        self.line_states.clear();
        self.line_states.resize(line_count, None);
        self.mark_all_dirty();
    }

    /// Re-tokenize dirty lines.
    ///
    /// Should be called before rendering if the buffer has changed.
    pub fn update_highlighting(&mut self) {
        let Some(tokenizer) = self.tokenizer.clone() else {
            return;
        };
        let Some((dirty_from, dirty_to)) = self.dirty.take() else {
            return;
        };

        let line_count = self.buffer.line_count();
        // A changed line count shifts every cache slot after the edit, so the
        // early stop below cannot trust the old entries.
        let count_changed = line_count != self.line_tokens.len();
        self.line_tokens.resize(line_count, Vec::new());
        self.line_states.resize(line_count, None);

        let start_line = dirty_from.min(line_count);
        let mut state = self.state_entering(start_line);

        let mut last = start_line;
        for i in start_line..line_count {
            let line = self.buffer.line_or_empty(i);
            let (tokens, new_state) = tokenizer.tokenize_line(&line, state);
            let tokens_changed = self.line_tokens[i] != tokens;
            let state_changed = self.line_states[i] != Some(new_state);

            if tokens_changed {
                self.line_tokens[i] = tokens;
            }
            if state_changed {
                self.line_states[i] = Some(new_state);
            }
            state = new_state;
            last = i;

            if !count_changed
                && i > start_line
                && i >= dirty_to
                && !tokens_changed
                && !state_changed
            {
                break;
            }
        }
        trace!(from = start_line, to = last, "re-highlighted lines");
    }

    /// Get cached tokens for a line.
    #[must_use]
    pub fn tokens_for_line(&self, line: usize) -> &[Token] {
        self.line_tokens.get(line).map_or(&[], Vec::as_slice)
    }

    /// Comment state entering `line`.
    #[must_use]
    pub fn state_entering(&self, line: usize) -> LineState {
        match line {
            0 => LineState::Normal,
            n => self.line_states.get(n - 1).copied().flatten().unwrap_or_default(),
        }
    }
}

impl Default for HighlightedBuffer {
    fn default() -> Self {
        Self::new(TextBuffer::new())
    }
}

impl std::fmt::Debug for HighlightedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HighlightedBuffer")
            .field("lines", &self.buffer.line_count())
            .field("tokenizer", &self.tokenizer.as_ref().map(|t| t.name().to_string()))
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::token::ColorClass;

    fn js_buffer(text: &str) -> HighlightedBuffer {
        HighlightedBuffer::new(TextBuffer::with_text(text))
            .with_language(Arc::new(LanguageDefinition::javascript()))
    }

    #[test]
    fn test_highlighted_buffer_basic() {
        let mut buffer = js_buffer("var x = 1;");
        buffer.update_highlighting();

        let tokens = buffer.tokens_for_line(0);
        assert_eq!(tokens[0].class, ColorClass::Reserved);
        assert!(tokens.iter().any(|t| t.class == ColorClass::NumericLiteral));
        assert_eq!(buffer.dirty_from(), None);
    }

    #[test]
    fn test_no_tokenizer_produces_no_tokens() {
        let mut buffer = HighlightedBuffer::new(TextBuffer::with_text("var x"));
        buffer.update_highlighting();
        assert!(buffer.tokens_for_line(0).is_empty());
        assert!(!buffer.has_tokenizer());
    }

    #[test]
    fn test_state_propagates_across_lines() {
        let mut buffer = js_buffer("a /* open\nstill\nclose */ b");
        buffer.update_highlighting();
        assert_eq!(buffer.state_entering(1), LineState::InComment);
        assert_eq!(buffer.state_entering(2), LineState::InComment);
        assert_eq!(buffer.tokens_for_line(1)[0].class, ColorClass::Comment);
        assert_eq!(buffer.tokens_for_line(2).last().unwrap().class, ColorClass::PlainText);
    }

    #[test]
    fn test_edit_reopens_comment_downstream() {
        let mut buffer = js_buffer("x\ny\nz");
        buffer.update_highlighting();
        assert_eq!(buffer.tokens_for_line(2)[0].class, ColorClass::PlainText);

        buffer.buffer_mut().replace_line(0, "/* x");
        buffer.mark_dirty(0);
        buffer.update_highlighting();
        assert_eq!(buffer.tokens_for_line(1)[0].class, ColorClass::Comment);
        assert_eq!(buffer.tokens_for_line(2)[0].class, ColorClass::Comment);
        assert_eq!(buffer.state_entering(2), LineState::InComment);
    }

    #[test]
    fn test_inserted_line_rescans_tail() {
        let mut buffer = js_buffer("a\nb");
        buffer.update_highlighting();
        buffer.buffer_mut().insert_line_after(0, "/*");
        buffer.mark_dirty_from(1);
        buffer.update_highlighting();
        assert_eq!(buffer.tokens_for_line(2)[0].class, ColorClass::Comment);
    }

    #[test]
    fn test_mark_dirty_keeps_minimum() {
        let mut buffer = js_buffer("a\nb\nc");
        buffer.update_highlighting();
        buffer.mark_dirty(2);
        buffer.mark_dirty(1);
        buffer.mark_dirty(2);
        assert_eq!(buffer.dirty_from(), Some(1));
        assert_eq!(buffer.dirty_to(), Some(2));

        buffer.mark_dirty_from(2);
        assert_eq!(buffer.dirty_from(), Some(1));
        assert_eq!(buffer.dirty_to(), Some(usize::MAX));
    }

    #[test]
    fn test_distant_edits_both_rehighlight() {
        let mut buffer = js_buffer("a\nb\nc\nd");
        buffer.update_highlighting();

        buffer.buffer_mut().replace_line(3, "var d");
        buffer.mark_dirty(3);
        buffer.buffer_mut().replace_line(0, "za");
        buffer.mark_dirty(0);
        buffer.update_highlighting();

        let classes: Vec<_> = buffer
            .tokens_for_line(3)
            .iter()
            .map(|t| (t.class, t.start, t.end))
            .collect();
        assert_eq!(
            classes,
            vec![(ColorClass::Reserved, 0, 3), (ColorClass::PlainText, 3, 5)]
        );
        assert_eq!(buffer.tokens_for_line(0), &[Token::new(ColorClass::PlainText, 0, 2)]);
        assert_eq!(buffer.dirty_from(), None);
    }

    #[test]
    fn test_switching_language_retokenizes() {
        let mut buffer = js_buffer("# float");
        buffer.update_highlighting();
        assert_eq!(buffer.tokens_for_line(0)[0].class, ColorClass::PlainText);
        buffer.set_language(Some(Arc::new(LanguageDefinition::raysl())));
        buffer.update_highlighting();
        assert_eq!(buffer.tokens_for_line(0)[0].class, ColorClass::Comment);
    }
}
