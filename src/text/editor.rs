//! The event-driven editing core shared by every text widget.
//!
//! [`TextEditingCore`] composes an [`EditBuffer`] and a [`Viewport`] with a
//! [`WidgetBehavior`] strategy that supplies what differs between a
//! single-line field, a plain text area and a code editor. Everything the
//! core talks to outside itself (data binding, clipboard, repaint requests,
//! text measurement, scrollbars) is injected.

// Event handlers dispatch over many keys
#![allow(clippy::too_many_lines)]

use crate::color::Rgba;
use crate::config::{EditFlags, EditorConfig};
use crate::error::Result;
use crate::highlight::{ColorClass, LanguageRegistry, Token};
use crate::input::{KeyCode, KeyEvent};
use crate::text::cursor::{Direction, Position};
use crate::text::edit::EditBuffer;
use crate::text::redraw::RedrawScheduler;
use crate::text::search::{SearchMatch, find_next, first_occurrence_in_line};
use crate::text::viewport::{Rect, Scrollbar, TextMeasure, Viewport};
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};
use tracing::debug;

const DOUBLE_CLICK_REDRAW: Duration = Duration::from_millis(30);
const AUTO_SCROLL_REDRAW: Duration = Duration::from_millis(10);

/// Receives committed values for a bound data path.
pub trait Committer {
    fn commit(&mut self, path: &str, value: &str, undo_label: Option<&str>);
}

/// Clipboard payload kinds. Text is the only kind this engine exchanges.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ClipboardKind {
    #[default]
    Text,
}

impl ClipboardKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "Text",
        }
    }
}

/// System clipboard collaborator, shared between widgets.
pub trait Clipboard {
    fn get_text(&self, kind: ClipboardKind) -> Option<String>;
    fn set_text(&self, kind: ClipboardKind, value: &str);
}

/// What Enter does in a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EnterAction {
    /// Commit the value.
    Submit,
    /// Split the line.
    Newline {
        mirror_indent: bool,
        extra_indent_on_open_brace: bool,
    },
}

/// What Tab does in a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TabAction {
    /// Commit the value and hand focus to the next widget.
    SubmitAndFocusNext,
    /// Insert one indentation unit of spaces.
    InsertSpaces,
}

/// Variant-specific behavior of a text widget.
pub trait WidgetBehavior {
    fn is_single_line(&self) -> bool;
    fn on_enter(&self, flags: EditFlags) -> EnterAction;
    fn on_tab(&self) -> TabAction;

    /// Whether idle changes are committed without losing focus.
    fn auto_commits(&self) -> bool {
        !self.is_single_line()
    }
}

/// Single-line field: Enter and Tab submit.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleLineBehavior;

impl WidgetBehavior for SingleLineBehavior {
    fn is_single_line(&self) -> bool {
        true
    }

    fn on_enter(&self, _flags: EditFlags) -> EnterAction {
        EnterAction::Submit
    }

    fn on_tab(&self) -> TabAction {
        TabAction::SubmitAndFocusNext
    }
}

/// Plain multi-line text: Enter splits, Tab indents.
#[derive(Clone, Copy, Debug, Default)]
pub struct MultiLineBehavior;

impl WidgetBehavior for MultiLineBehavior {
    fn is_single_line(&self) -> bool {
        false
    }

    fn on_enter(&self, _flags: EditFlags) -> EnterAction {
        EnterAction::Newline {
            mirror_indent: false,
            extra_indent_on_open_brace: false,
        }
    }

    fn on_tab(&self) -> TabAction {
        TabAction::InsertSpaces
    }
}

/// Code editor: Enter keeps the indentation going.
#[derive(Clone, Copy, Debug, Default)]
pub struct CodeBehavior;

impl WidgetBehavior for CodeBehavior {
    fn is_single_line(&self) -> bool {
        false
    }

    fn on_enter(&self, flags: EditFlags) -> EnterAction {
        EnterAction::Newline {
            mirror_indent: flags.contains(EditFlags::MIRROR_INDENT),
            extra_indent_on_open_brace: flags.contains(EditFlags::EXTRA_INDENT_ON_OPEN_BRACE),
        }
    }

    fn on_tab(&self) -> TabAction {
        TabAction::InsertSpaces
    }
}

/// Result of a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOutcome {
    /// The key is not handled by the editor.
    Ignored,
    Handled,
    /// Enter in a single-line field.
    Submitted,
    /// Focus should move to the next widget.
    FocusNext,
}

struct Binding {
    path: String,
    undo_label: Option<String>,
    committer: Box<dyn Committer>,
}

#[derive(Clone, Debug)]
struct SearchState {
    term: String,
    case_sensitive: bool,
    last_result: Option<SearchMatch>,
}

/// Highlighted occurrence of the search term on one line.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchHighlight {
    pub rect: Rect,
    /// The occurrence is the last search result.
    pub active: bool,
}

/// One colored run of text.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    pub x: f32,
    pub text: String,
    pub class: ColorClass,
    pub color: Rgba,
}

/// Everything a renderer needs to draw one line.
#[derive(Clone, Debug, PartialEq)]
pub struct LineLayout {
    pub line: usize,
    pub top: f32,
    pub selection: Option<Rect>,
    pub search: Option<SearchHighlight>,
    pub cursor: Option<Rect>,
    pub error: bool,
    pub runs: Vec<TextRun>,
}

/// Editing engine behind one text widget.
pub struct TextEditingCore {
    edit: EditBuffer,
    viewport: Viewport,
    behavior: Box<dyn WidgetBehavior>,
    config: EditorConfig,
    flags: EditFlags,

    binding: Option<Binding>,
    clipboard: Option<Rc<dyn Clipboard>>,
    invalidate: Option<Box<dyn FnMut()>>,
    input_filter: Option<Box<dyn Fn(&str) -> String>>,
    clock: Box<dyn Fn() -> Instant>,

    languages: LanguageRegistry,
    language_index: Option<usize>,
    search: Option<SearchState>,
    error_line: Option<usize>,

    focused: bool,
    dragging: bool,
    pointer: Option<(f32, f32)>,
    last_double_click: Option<Instant>,
    last_change: Option<Instant>,
    blink_visible: bool,
    next_blink: Option<Instant>,
    redraw: RedrawScheduler,
}

impl TextEditingCore {
    /// Create a core with the given configuration and behavior.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new(
        config: EditorConfig,
        behavior: Box<dyn WidgetBehavior>,
        measure: Option<Rc<dyn TextMeasure>>,
    ) -> Self {
        let flags = config.flags();
        let edit = EditBuffer::new().with_flags(flags);
        let mut viewport = Viewport::new(measure).with_spacing(config.line_spacing as f32);
        viewport.verify_text(edit.buffer());
        Self {
            edit,
            viewport,
            behavior,
            config,
            flags,
            binding: None,
            clipboard: None,
            invalidate: None,
            input_filter: None,
            clock: Box::new(Instant::now),
            languages: LanguageRegistry::new(),
            language_index: None,
            search: None,
            error_line: None,
            focused: false,
            dragging: false,
            pointer: None,
            last_double_click: None,
            last_change: None,
            blink_visible: true,
            next_blink: None,
            redraw: RedrawScheduler::new(),
        }
    }

    /// Single-line field.
    #[must_use]
    pub fn line_edit(measure: Option<Rc<dyn TextMeasure>>) -> Self {
        Self::new(EditorConfig::line_edit(), Box::new(SingleLineBehavior), measure)
    }

    /// Plain multi-line text area.
    #[must_use]
    pub fn text_edit(measure: Option<Rc<dyn TextMeasure>>) -> Self {
        Self::new(EditorConfig::text_edit(), Box::new(MultiLineBehavior), measure)
    }

    /// Code editor with the built-in languages, JavaScript active.
    #[must_use]
    pub fn code_edit(measure: Option<Rc<dyn TextMeasure>>) -> Self {
        let mut core = Self::new(EditorConfig::code_edit(), Box::new(CodeBehavior), measure)
            .with_languages(LanguageRegistry::with_builtins());
        // Index 0 always exists in the built-in registry.
        if core.set_language_index(0).is_err() {
            core.language_index = None;
        }
        core
    }

    /// Builder: bind to a data path.
    #[must_use]
    pub fn with_binding(
        mut self,
        path: impl Into<String>,
        undo_label: Option<&str>,
        committer: Box<dyn Committer>,
    ) -> Self {
        self.binding = Some(Binding {
            path: path.into(),
            undo_label: undo_label.map(str::to_string),
            committer,
        });
        self
    }

    /// Builder: clipboard collaborator.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: Rc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    /// Builder: repaint request callback.
    #[must_use]
    pub fn with_invalidate(mut self, invalidate: impl FnMut() + 'static) -> Self {
        self.invalidate = Some(Box::new(invalidate));
        self
    }

    /// Builder: filter applied to typed text before insertion.
    #[must_use]
    pub fn with_input_filter(mut self, filter: impl Fn(&str) -> String + 'static) -> Self {
        self.input_filter = Some(Box::new(filter));
        self
    }

    /// Builder: scrollbars driven by the viewport.
    #[must_use]
    pub fn with_scrollbars(
        mut self,
        vertical: Option<Box<dyn Scrollbar>>,
        horizontal: Option<Box<dyn Scrollbar>>,
    ) -> Self {
        self.viewport.set_scrollbars(vertical, horizontal);
        self
    }

    /// Builder: time source for event timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> Instant + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Builder: languages selectable with [`set_language_index`](Self::set_language_index).
    #[must_use]
    pub fn with_languages(mut self, languages: LanguageRegistry) -> Self {
        self.languages = languages;
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub fn text(&self) -> String {
        self.edit.text()
    }

    #[must_use]
    pub fn edit_buffer(&self) -> &EditBuffer {
        &self.edit
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    #[must_use]
    pub fn cursor(&self) -> Position {
        self.edit.cursor()
    }

    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.flags.contains(EditFlags::READ_ONLY)
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.flags.set(EditFlags::READ_ONLY, read_only);
        self.config.read_only = read_only;
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.focused
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Whether the cursor is in the visible half of its blink cycle.
    #[must_use]
    pub fn blink_visible(&self) -> bool {
        self.blink_visible
    }

    #[must_use]
    pub fn language_index(&self) -> Option<usize> {
        self.language_index
    }

    #[must_use]
    pub fn error_line(&self) -> Option<usize> {
        self.error_line
    }

    #[must_use]
    pub fn redraw_scheduler(&self) -> &RedrawScheduler {
        &self.redraw
    }

    /// Set the rectangle the text is drawn into.
    pub fn set_content_rect(&mut self, rect: Rect) {
        self.viewport.set_content_rect(rect);
        self.viewport.verify_scrollbars();
    }

    // ========================================================================
    // Value binding
    // ========================================================================

    /// Take a value from the data model. `None` clears the text.
    ///
    /// Not an edit: the changed flag is left alone.
    pub fn value_from_model(&mut self, value: Option<&str>) {
        self.edit.set_text(value);
        self.viewport.verify_text(self.edit.buffer());
        self.viewport.verify_scrollbars();
        self.request_redraw();
    }

    /// Commit the text if it changed since the last commit.
    ///
    /// Returns whether a change was pending. Without a binding the change is
    /// dropped.
    pub fn commit_if_changed(&mut self) -> bool {
        if !self.edit.take_changed() {
            return false;
        }
        self.last_change = None;
        if let Some(binding) = self.binding.as_mut() {
            let value = self.edit.text();
            debug!(path = %binding.path, len = value.len(), "committing text");
            binding
                .committer
                .commit(&binding.path, &value, binding.undo_label.as_deref());
        }
        true
    }

    // ========================================================================
    // Keyboard
    // ========================================================================

    /// Handle a key press.
    pub fn key_down(&mut self, event: KeyEvent) -> KeyOutcome {
        let read_only = self.is_read_only();
        let outcome = match event.code {
            KeyCode::Left | KeyCode::Right => {
                let direction = if event.code == KeyCode::Left {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                self.edit.move_horizontal(direction, event.line_jump());
                KeyOutcome::Handled
            }
            KeyCode::Home => {
                self.edit.move_horizontal(Direction::Backward, true);
                KeyOutcome::Handled
            }
            KeyCode::End => {
                self.edit.move_horizontal(Direction::Forward, true);
                KeyOutcome::Handled
            }
            KeyCode::Up | KeyCode::Down if event.alt() => {
                let direction = if event.code == KeyCode::Up {
                    Direction::Backward
                } else {
                    Direction::Forward
                };
                self.page(direction);
                KeyOutcome::Handled
            }
            KeyCode::PageUp => {
                self.page(Direction::Backward);
                KeyOutcome::Handled
            }
            KeyCode::PageDown => {
                self.page(Direction::Forward);
                KeyOutcome::Handled
            }
            KeyCode::Up => {
                self.edit.move_vertical(-1);
                KeyOutcome::Handled
            }
            KeyCode::Down => {
                self.edit.move_vertical(1);
                KeyOutcome::Handled
            }
            KeyCode::Backspace if !read_only => {
                let indent = self
                    .flags
                    .contains(EditFlags::INDENT_AWARE_BACKSPACE)
                    .then_some(self.config.indent_width);
                let joins_lines =
                    self.edit.selection().is_valid() || self.edit.cursor().column == 0;
                if self.edit.backspace(indent) {
                    if joins_lines {
                        self.after_edit();
                    } else {
                        self.after_line_edit();
                    }
                }
                KeyOutcome::Handled
            }
            KeyCode::Enter => match self.behavior.on_enter(self.flags) {
                EnterAction::Submit => {
                    self.commit_if_changed();
                    KeyOutcome::Submitted
                }
                EnterAction::Newline { .. } if read_only => KeyOutcome::Ignored,
                EnterAction::Newline {
                    mirror_indent,
                    extra_indent_on_open_brace,
                } => {
                    self.edit.newline(
                        mirror_indent,
                        extra_indent_on_open_brace,
                        Some(self.config.indent_width),
                    );
                    self.after_edit();
                    KeyOutcome::Handled
                }
            },
            KeyCode::Tab => match self.behavior.on_tab() {
                TabAction::SubmitAndFocusNext => {
                    self.commit_if_changed();
                    KeyOutcome::FocusNext
                }
                TabAction::InsertSpaces if read_only => KeyOutcome::Ignored,
                TabAction::InsertSpaces => {
                    let replaced = self.edit.delete_selection();
                    self.edit.tab(self.config.indent_width);
                    if replaced {
                        self.after_edit();
                    } else {
                        self.after_line_edit();
                    }
                    KeyOutcome::Handled
                }
            },
            KeyCode::Char(c) if event.line_jump() => self.shortcut(c),
            KeyCode::Backspace | KeyCode::Char(_) | KeyCode::Esc => KeyOutcome::Ignored,
        };

        if outcome == KeyOutcome::Handled && event.code.is_navigation() {
            let cursor = self.edit.cursor();
            self.viewport.ensure_cursor_visible(self.edit.buffer(), cursor);
        }
        if outcome != KeyOutcome::Ignored {
            self.reset_blink();
            self.request_redraw();
        }
        outcome
    }

    fn shortcut(&mut self, key: char) -> KeyOutcome {
        let handled = match key.to_ascii_lowercase() {
            'a' => {
                self.edit.select_all();
                true
            }
            'c' => self.clipboard_copy(),
            'x' => self.clipboard_cut(),
            'v' => self.clipboard_paste(),
            _ => return KeyOutcome::Ignored,
        };
        if handled {
            KeyOutcome::Handled
        } else {
            KeyOutcome::Ignored
        }
    }

    fn page(&mut self, direction: Direction) {
        let lines = self.viewport.page(direction);
        self.edit.move_page(direction, lines);
    }

    /// Handle typed text.
    pub fn text_input(&mut self, text: &str) -> bool {
        if self.is_read_only() {
            return false;
        }
        let replaced = self.edit.delete_selection();
        let filtered;
        let text = match &self.input_filter {
            Some(filter) => {
                filtered = filter(text);
                filtered.as_str()
            }
            None => text,
        };
        self.edit.type_character(text);
        if replaced {
            self.after_edit();
        } else {
            self.after_line_edit();
        }
        self.reset_blink();
        true
    }

    // ========================================================================
    // Pointer
    // ========================================================================

    /// Primary button pressed at (x, y).
    ///
    /// A press shortly after a double click selects the whole line.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        let now = (self.clock)();
        let window = self.config.multi_click_window();
        let triple = self
            .last_double_click
            .is_some_and(|at| now.saturating_duration_since(at) < window);
        if triple {
            self.last_double_click = None;
            let line = self.edit.cursor().line;
            self.edit.select_line(line);
        } else {
            self.dragging = true;
            self.pointer = Some((x, y));
            let pos = self.viewport.position_at_point(self.edit.buffer(), x, y);
            self.edit.begin_selection(pos);
        }
        self.reset_blink();
        self.request_redraw();
    }

    /// Pointer moved to (x, y). Extends the selection while dragging.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if !self.dragging {
            return;
        }
        self.pointer = Some((x, y));
        let pos = self.viewport.position_at_point(self.edit.buffer(), x, y);
        self.edit.extend_selection(pos);
        if self.edit.selection().is_valid() {
            self.request_redraw();
        }
    }

    pub fn pointer_up(&mut self) {
        self.dragging = false;
    }

    /// Double click at (x, y): select the word there, or its line.
    pub fn double_click(&mut self, x: f32, y: f32) {
        self.dragging = false;
        let now = (self.clock)();
        let pos = self.viewport.position_at_point(self.edit.buffer(), x, y);
        self.edit.set_cursor(pos);
        if self.edit.select_word_at(pos) {
            self.last_double_click = Some(now);
            self.redraw.schedule_in(now, DOUBLE_CLICK_REDRAW);
        } else {
            self.edit.clear_selection();
        }
        self.request_redraw();
    }

    /// The vertical scrollbar handle was dragged to `offset`.
    pub fn v_scrollbar_moved(&mut self, offset: f32) {
        self.viewport.on_v_handle_moved(offset);
        self.request_redraw();
    }

    /// The horizontal scrollbar handle was dragged to `offset`.
    pub fn h_scrollbar_moved(&mut self, offset: f32) {
        self.viewport.on_h_handle_moved(offset);
        self.request_redraw();
    }

    /// Mouse wheel; positive steps scroll up.
    pub fn wheel(&mut self, step: i32) -> bool {
        if !self.viewport.wheel(step) {
            return false;
        }
        self.reset_blink();
        self.request_redraw();
        true
    }

    // ========================================================================
    // Focus and timers
    // ========================================================================

    pub fn focus_in(&mut self) {
        self.focused = true;
        self.reset_blink();
        if self.behavior.is_single_line() {
            self.edit.select_all();
        }
        self.request_redraw();
    }

    /// Losing focus flushes a pending change to the binding.
    pub fn focus_out(&mut self) {
        self.focused = false;
        self.dragging = false;
        self.commit_if_changed();
        self.request_redraw();
    }

    /// Advance timers: cursor blink, idle auto-commit, drag auto-scroll and
    /// pending redraws. The invalidate callback fires at most once.
    pub fn tick(&mut self, now: Instant) {
        let mut repaint = false;

        if self.focused && self.next_blink.is_some_and(|at| now >= at) {
            self.blink_visible = !self.blink_visible;
            self.next_blink = Some(now + self.config.blink_interval());
            repaint = true;

            let idle = self
                .last_change
                .is_some_and(|at| now.saturating_duration_since(at) > self.config.auto_commit_delay());
            if self.behavior.auto_commits() && idle {
                self.commit_if_changed();
            }
        }

        if self.dragging && self.edit.selection().is_valid() {
            if let Some((x, y)) = self.pointer {
                if self.viewport.auto_scroll(y) {
                    let pos = self.viewport.position_at_point(self.edit.buffer(), x, y);
                    self.edit.extend_selection(pos);
                    self.redraw.schedule_in(now, AUTO_SCROLL_REDRAW);
                }
            }
        }

        if self.redraw.take_due(now) {
            repaint = true;
        }
        if repaint {
            self.request_redraw();
        }
    }

    fn reset_blink(&mut self) {
        self.blink_visible = true;
        self.next_blink = Some((self.clock)() + self.config.blink_interval());
    }

    fn request_redraw(&mut self) {
        if let Some(invalidate) = self.invalidate.as_mut() {
            invalidate();
        }
    }

    fn after_edit(&mut self) {
        self.viewport.verify_text(self.edit.buffer());
        self.settle_edit();
    }

    /// Only the cursor line changed.
    fn after_line_edit(&mut self) {
        let line = self.edit.cursor().line;
        self.viewport.verify_line_change(self.edit.buffer(), line);
        self.settle_edit();
    }

    fn settle_edit(&mut self) {
        let now = (self.clock)();
        self.last_change = Some(now);
        self.viewport.verify_scrollbars();
        let cursor = self.edit.cursor();
        self.viewport.ensure_cursor_visible(self.edit.buffer(), cursor);
        self.request_redraw();
    }

    // ========================================================================
    // Clipboard
    // ========================================================================

    /// Kind offered to the clipboard when something is selected.
    #[must_use]
    pub fn clipboard_copy_available(&self) -> Option<ClipboardKind> {
        self.edit
            .selection()
            .is_valid()
            .then_some(ClipboardKind::Text)
    }

    #[must_use]
    pub fn clipboard_paste_available(&self, kind: ClipboardKind) -> bool {
        kind == ClipboardKind::Text && !self.is_read_only()
    }

    /// Copy the selection. Returns whether anything was copied.
    pub fn clipboard_copy(&mut self) -> bool {
        let (Some(clipboard), Some(text)) = (self.clipboard.as_ref(), self.edit.selected_text())
        else {
            return false;
        };
        clipboard.set_text(ClipboardKind::Text, &text);
        true
    }

    /// Copy and delete the selection, then commit.
    pub fn clipboard_cut(&mut self) -> bool {
        if self.is_read_only() || !self.clipboard_copy() {
            return false;
        }
        self.edit.delete_selection();
        self.after_edit();
        self.commit_if_changed();
        true
    }

    /// Replace the selection with the clipboard text, then commit.
    pub fn clipboard_paste(&mut self) -> bool {
        if !self.clipboard_paste_available(ClipboardKind::Text) {
            return false;
        }
        let Some(text) = self
            .clipboard
            .as_ref()
            .and_then(|clipboard| clipboard.get_text(ClipboardKind::Text))
        else {
            return false;
        };
        self.edit.delete_selection();
        self.edit.insert_text(&text);
        self.after_edit();
        self.commit_if_changed();
        true
    }

    /// Delete the selection, then commit.
    pub fn clipboard_delete_selection(&mut self) -> bool {
        if self.is_read_only() || !self.edit.delete_selection() {
            return false;
        }
        self.after_edit();
        self.commit_if_changed();
        true
    }

    // ========================================================================
    // Navigation helpers
    // ========================================================================

    /// Put the cursor at the start of `line` and center it.
    pub fn goto_line(&mut self, line: usize) {
        self.edit.set_cursor(Position::new(line, 0));
        self.edit.clear_selection();
        self.viewport.verify_scrollbars();
        self.viewport.goto_line(self.edit.cursor().line);
        self.request_redraw();
    }

    /// Set the term highlighted and searched by
    /// [`goto_next_search_term`](Self::goto_next_search_term). An empty term
    /// clears the search.
    pub fn set_search_term(&mut self, term: &str, case_sensitive: bool) {
        self.search = (!term.is_empty()).then(|| SearchState {
            term: term.to_string(),
            case_sensitive,
            last_result: None,
        });
        self.request_redraw();
    }

    /// Jump to the next occurrence of the search term.
    pub fn goto_next_search_term(&mut self, direction: Direction) -> Option<SearchMatch> {
        let search = self.search.as_ref()?;
        let found = find_next(
            self.edit.buffer(),
            self.edit.cursor(),
            &search.term,
            search.case_sensitive,
            direction,
        );
        if let Some(search) = self.search.as_mut() {
            search.last_result = found;
        }
        let hit = found?;
        self.edit.clear_selection();
        self.goto_line(hit.position.line);
        self.edit.set_cursor(hit.position);
        self.reset_blink();
        Some(hit)
    }

    /// Activate the language at `index` of the registry.
    pub fn set_language_index(&mut self, index: usize) -> Result<()> {
        let language = self.languages.get(index)?;
        debug!(index, name = %language.name, "switching language");
        self.edit
            .highlighted_buffer_mut()
            .set_language(Some(language));
        self.language_index = Some(index);
        self.request_redraw();
        Ok(())
    }

    /// Flag `line` as the one with an error, or clear the flag.
    pub fn set_error_line(&mut self, line: Option<usize>) {
        self.error_line = line;
        self.request_redraw();
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Bring highlighting up to date and lay out every visible line.
    pub fn layout(&mut self) -> Vec<LineLayout> {
        self.edit.highlighted_buffer_mut().update_highlighting();
        self.viewport
            .visible_lines()
            .map(|line| self.layout_line(line))
            .collect()
    }

    /// Geometry of one line from the current highlight cache.
    #[must_use]
    pub fn layout_line(&self, line: usize) -> LineLayout {
        let buffer = self.edit.buffer();
        let text = buffer.line_or_empty(line);
        let len = text.chars().count();

        let selection = self
            .edit
            .selection()
            .line_span(line, len)
            .map(|span| self.viewport.span_rect(&text, line, span));

        let search = self.search.as_ref().and_then(|search| {
            let span = first_occurrence_in_line(&text, &search.term, search.case_sensitive)?;
            let active = search
                .last_result
                .is_some_and(|hit| hit.position == Position::new(line, span.start));
            Some(SearchHighlight {
                rect: self.viewport.span_rect(&text, line, span),
                active,
            })
        });

        let cursor = self.edit.cursor();
        let cursor = (self.focused && self.blink_visible && cursor.line == line)
            .then(|| self.viewport.cursor_rect(buffer, cursor));

        LineLayout {
            line,
            top: self.viewport.line_top(line),
            selection,
            search,
            cursor,
            error: self.error_line == Some(line),
            runs: self.runs_for_line(line, &text),
        }
    }

    fn runs_for_line(&self, line: usize, text: &str) -> Vec<TextRun> {
        let highlighted = self.edit.highlighted_buffer();
        let palette = highlighted.palette();
        let origin = self.viewport.content_rect().x - self.viewport.offset().0;
        let run = |token: &Token| TextRun {
            x: origin + self.viewport.column_to_pixel(text, token.start),
            text: token.text(text),
            class: token.class,
            color: palette.color_for(token.class),
        };

        let tokens = highlighted.tokens_for_line(line);
        if tokens.is_empty() {
            if text.is_empty() {
                return Vec::new();
            }
            let plain = Token::new(ColorClass::PlainText, 0, text.chars().count());
            return vec![run(&plain)];
        }
        tokens.iter().map(run).collect()
    }
}

impl fmt::Debug for TextEditingCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextEditingCore")
            .field("edit", &self.edit)
            .field("viewport", &self.viewport)
            .field("single_line", &self.behavior.is_single_line())
            .field("flags", &self.flags)
            .field("focused", &self.focused)
            .field("language_index", &self.language_index)
            .finish_non_exhaustive()
    }
}
