//! Pixel geometry, scrolling and scrollbar coordination.
//!
//! [`Viewport`] maps buffer positions to pixel offsets through an injected
//! [`TextMeasure`] and keeps the scroll offsets and the injected
//! [`Scrollbar`]s in sync with the content extents. Without a measure every
//! size is zero and no scrollbar is ever needed.

use crate::text::buffer::TextBuffer;
use crate::text::cursor::{Direction, Position};
use crate::text::edit::split_at_column;
use crate::unicode::{WidthMethod, display_width_with_method};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;
use tracing::debug;

/// Width and height in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Whether the point lies inside (right/bottom edges exclusive).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Font handed to the measurement collaborator.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: String,
    pub size: f32,
}

impl Default for Font {
    fn default() -> Self {
        Self {
            family: "monospace".to_string(),
            size: 13.0,
        }
    }
}

/// Text measurement collaborator.
pub trait TextMeasure {
    /// Pixel size of `text` rendered in `font`.
    fn measure(&self, font: &Font, text: &str) -> Size;

    /// Height of one line of `font`.
    fn line_height(&self, font: &Font) -> f32;
}

/// Fixed-cell measurement: every display column is `cell_width` wide.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonospaceMeasure {
    pub cell_width: f32,
    pub cell_height: f32,
    pub method: WidthMethod,
}

impl MonospaceMeasure {
    #[must_use]
    pub fn new(cell_width: f32, cell_height: f32) -> Self {
        Self {
            cell_width,
            cell_height,
            method: WidthMethod::default(),
        }
    }
}

impl TextMeasure for MonospaceMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn measure(&self, _font: &Font, text: &str) -> Size {
        let columns = display_width_with_method(text, self.method);
        Size::new(columns as f32 * self.cell_width, self.cell_height)
    }

    fn line_height(&self, _font: &Font) -> f32 {
        self.cell_height
    }
}

/// Scrollbar collaborator. Only its range and position are driven here.
pub trait Scrollbar {
    fn set_range(&mut self, total: f32, visible: f32);
    fn scroll_to(&mut self, offset: f32);
}

/// Scroll state and geometry for one editing widget.
pub struct Viewport {
    measure: Option<Rc<dyn TextMeasure>>,
    font: Font,
    spacing: f32,
    content: Rect,
    supports_scrollbars: bool,
    v_scrollbar: Option<Box<dyn Scrollbar>>,
    h_scrollbar: Option<Box<dyn Scrollbar>>,

    offset_x: f32,
    offset_y: f32,

    // Content extents, refreshed by verify_text / verify_line_change
    line_count: usize,
    line_height: f32,
    max_line_width: f32,
    max_line: usize,

    // Derived by verify_scrollbars
    total_height: f32,
    height_per_item: f32,
    visible_items: usize,
    needs_v: bool,
    needs_h: bool,
}

impl Viewport {
    /// Viewport measuring text with `measure`, or with zero sizes when `None`.
    #[must_use]
    pub fn new(measure: Option<Rc<dyn TextMeasure>>) -> Self {
        Self {
            measure,
            font: Font::default(),
            spacing: 0.0,
            content: Rect::default(),
            supports_scrollbars: false,
            v_scrollbar: None,
            h_scrollbar: None,
            offset_x: 0.0,
            offset_y: 0.0,
            line_count: 1,
            line_height: 0.0,
            max_line_width: 0.0,
            max_line: 0,
            total_height: 0.0,
            height_per_item: 0.0,
            visible_items: 0,
            needs_v: false,
            needs_h: false,
        }
    }

    /// Builder: font.
    #[must_use]
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Builder: extra pixels between lines.
    #[must_use]
    pub fn with_spacing(mut self, spacing: f32) -> Self {
        self.set_spacing(spacing);
        self
    }

    /// Builder: enable scrolling, driving the given scrollbars.
    #[must_use]
    pub fn with_scrollbars(
        mut self,
        vertical: Option<Box<dyn Scrollbar>>,
        horizontal: Option<Box<dyn Scrollbar>>,
    ) -> Self {
        self.set_scrollbars(vertical, horizontal);
        self
    }

    /// Enable scrolling, driving the given scrollbars.
    pub fn set_scrollbars(
        &mut self,
        vertical: Option<Box<dyn Scrollbar>>,
        horizontal: Option<Box<dyn Scrollbar>>,
    ) {
        self.supports_scrollbars = true;
        self.v_scrollbar = vertical;
        self.h_scrollbar = horizontal;
    }

    /// Set the extra pixels between lines.
    pub fn set_spacing(&mut self, spacing: f32) {
        self.spacing = spacing;
    }

    /// Set the rectangle text is drawn into.
    pub fn set_content_rect(&mut self, rect: Rect) {
        self.content = rect;
    }

    #[must_use]
    pub fn content_rect(&self) -> Rect {
        self.content
    }

    #[must_use]
    pub fn font(&self) -> &Font {
        &self.font
    }

    #[must_use]
    pub fn has_measure(&self) -> bool {
        self.measure.is_some()
    }

    /// Current (x, y) scroll offsets.
    #[must_use]
    pub fn offset(&self) -> (f32, f32) {
        (self.offset_x, self.offset_y)
    }

    #[must_use]
    pub fn needs_v_scrollbar(&self) -> bool {
        self.needs_v
    }

    #[must_use]
    pub fn needs_h_scrollbar(&self) -> bool {
        self.needs_h
    }

    /// Whole lines that fit in the content rectangle.
    #[must_use]
    pub fn visible_items(&self) -> usize {
        self.visible_items
    }

    #[must_use]
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Line height plus spacing.
    #[must_use]
    pub fn item_height(&self) -> f32 {
        self.line_height + self.spacing
    }

    /// Width of the widest line and its index.
    #[must_use]
    pub fn max_line(&self) -> (usize, f32) {
        (self.max_line, self.max_line_width)
    }

    /// Measured width of `text`; 0 without a measure.
    #[must_use]
    pub fn text_width(&self, text: &str) -> f32 {
        self.measure
            .as_ref()
            .map_or(0.0, |m| m.measure(&self.font, text).width)
    }

    // ========================================================================
    // Content extents
    // ========================================================================

    /// Re-measure every line.
    pub fn verify_text(&mut self, buffer: &TextBuffer) {
        self.line_count = buffer.line_count();
        self.line_height = self
            .measure
            .as_ref()
            .map_or(0.0, |m| m.line_height(&self.font));
        self.max_line_width = 0.0;
        self.max_line = 0;
        for (idx, line) in buffer.lines().enumerate() {
            let width = self.text_width(&line);
            if width > self.max_line_width {
                self.max_line_width = width;
                self.max_line = idx;
            }
        }
    }

    /// Re-measure one edited line.
    ///
    /// Falls back to [`verify_text`](Self::verify_text) when the line count
    /// moved or the widest line got narrower.
    pub fn verify_line_change(&mut self, buffer: &TextBuffer, line: usize) {
        if buffer.line_count() != self.line_count {
            self.verify_text(buffer);
            return;
        }
        let width = self.text_width(&buffer.line_or_empty(line));
        if width >= self.max_line_width {
            self.max_line_width = width;
            self.max_line = line;
        } else if line == self.max_line {
            self.verify_text(buffer);
        }
    }

    /// Decide which scrollbars are needed and push ranges to them.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn verify_scrollbars(&mut self) {
        let lines = self.line_count.max(1) as f32;
        self.total_height = lines * self.line_height + (lines - 1.0) * self.spacing;
        self.height_per_item = self.total_height / lines;
        self.visible_items = if self.height_per_item > 0.0 {
            (self.content.height / self.height_per_item).floor().max(0.0) as usize
        } else {
            0
        };

        let needs_v = self.supports_scrollbars && self.total_height > self.content.height;
        let needs_h = self.supports_scrollbars && self.max_line_width > self.content.width;
        if needs_v != self.needs_v || needs_h != self.needs_h {
            debug!(vertical = needs_v, horizontal = needs_h, "scrollbar need changed");
        }
        self.needs_v = needs_v;
        self.needs_h = needs_h;

        if self.needs_v {
            self.offset_y = self.offset_y.clamp(0.0, self.max_offset_y());
            if let Some(bar) = self.v_scrollbar.as_mut() {
                bar.set_range(self.total_height, self.content.height);
                bar.scroll_to(self.offset_y);
            }
        } else {
            self.offset_y = 0.0;
        }
        if self.needs_h {
            if let Some(bar) = self.h_scrollbar.as_mut() {
                bar.set_range(self.max_line_width, self.content.width);
                bar.scroll_to(self.offset_x);
            }
        } else {
            self.offset_x = 0.0;
        }
    }

    fn max_offset_y(&self) -> f32 {
        (self.total_height - self.content.height).max(0.0)
    }

    fn set_offset_y(&mut self, offset: f32) {
        self.offset_y = offset.clamp(0.0, self.max_offset_y());
        if let Some(bar) = self.v_scrollbar.as_mut() {
            bar.scroll_to(self.offset_y);
        }
    }

    fn set_offset_x(&mut self, offset: f32) {
        self.offset_x = offset.max(0.0);
        if let Some(bar) = self.h_scrollbar.as_mut() {
            bar.scroll_to(self.offset_x);
        }
    }

    // ========================================================================
    // Position <-> pixel mapping
    // ========================================================================

    /// Pixel offset of `column` from the start of `line_text`.
    #[must_use]
    pub fn column_to_pixel(&self, line_text: &str, column: usize) -> f32 {
        self.text_width(split_at_column(line_text, column).0)
    }

    /// Top edge of `line` on screen.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn line_top(&self, line: usize) -> f32 {
        self.content.y + line as f32 * self.item_height() - self.offset_y
    }

    /// Buffer position under the pixel point (x, y).
    ///
    /// The column snaps to whichever side of the character under the point
    /// is nearer.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn position_at_point(&self, buffer: &TextBuffer, x: f32, y: f32) -> Position {
        let line = if self.height_per_item > 0.0 {
            let row = ((self.offset_y + y - self.content.y) / self.height_per_item).floor();
            (row.max(0.0) as usize).min(buffer.last_line())
        } else {
            0
        };

        let text = buffer.line_or_empty(line);
        let target = x - self.content.x + self.offset_x;
        let len = text.chars().count();
        let mut left = 0.0;
        for column in 1..=len {
            let right = self.column_to_pixel(&text, column);
            if right >= target {
                let column = if target <= left + (right - left) / 2.0 {
                    column - 1
                } else {
                    column
                };
                return Position::new(line, column);
            }
            left = right;
        }
        Position::new(line, if target <= 0.0 { 0 } else { len })
    }

    /// Scroll just enough to bring the cursor inside the content rectangle.
    #[allow(clippy::cast_precision_loss)]
    pub fn ensure_cursor_visible(&mut self, buffer: &TextBuffer, cursor: Position) {
        if self.needs_h {
            let text = buffer.line_or_empty(cursor.line);
            let x = self.column_to_pixel(&text, cursor.column) - self.offset_x;
            if x > self.content.width {
                self.set_offset_x(self.offset_x + x - self.content.width);
            } else if x < 0.0 {
                self.set_offset_x(self.offset_x + x);
            }
        }
        if self.needs_v {
            let top = cursor.line as f32 * self.item_height();
            if top < self.offset_y {
                self.set_offset_y(top);
            } else if top + self.line_height > self.offset_y + self.content.height {
                self.set_offset_y(top + self.line_height - self.content.height);
            }
        }
    }

    // ========================================================================
    // Scrolling
    // ========================================================================

    /// Scroll one item per wheel step; positive steps scroll up.
    /// Returns false when no vertical scrolling is possible.
    pub fn wheel(&mut self, step: i32) -> bool {
        if !self.needs_v || step == 0 {
            return false;
        }
        let delta = if step > 0 {
            -self.item_height()
        } else {
            self.item_height()
        };
        self.set_offset_y(self.offset_y + delta);
        true
    }

    /// Scroll one page of visible items. Returns the page size in lines.
    #[allow(clippy::cast_precision_loss)]
    pub fn page(&mut self, direction: Direction) -> usize {
        let lines = self.visible_items;
        let delta = lines as f32 * self.item_height();
        match direction {
            Direction::Backward => self.set_offset_y(self.offset_y - delta),
            Direction::Forward => self.set_offset_y(self.offset_y + delta),
        }
        lines
    }

    /// Center `line` vertically.
    #[allow(clippy::cast_precision_loss)]
    pub fn goto_line(&mut self, line: usize) {
        if !self.needs_v {
            return;
        }
        let top = line as f32 - self.visible_items as f32 / 2.0;
        self.set_offset_y(top * self.item_height());
    }

    /// The user dragged the vertical handle to `offset` in scrollbar space.
    pub fn on_v_handle_moved(&mut self, offset: f32) {
        if self.content.height > 0.0 {
            self.offset_y = offset * self.total_height / self.content.height;
        }
    }

    /// The user dragged the horizontal handle to `offset` in scrollbar space.
    pub fn on_h_handle_moved(&mut self, offset: f32) {
        if self.content.width > 0.0 {
            self.offset_x = offset * self.max_line_width / self.content.width;
        }
    }

    /// Scroll one line when `y` is in the top or bottom fifth of the content
    /// rectangle. Returns whether the offset moved.
    pub fn auto_scroll(&mut self, y: f32) -> bool {
        let before = self.offset_y;
        let band = self.content.height / 5.0;
        if y > self.content.bottom() - band {
            self.wheel(-1);
        } else if y - self.content.y < band {
            self.wheel(1);
        }
        (self.offset_y - before).abs() > f32::EPSILON
    }

    /// Lines at least partly inside the content rectangle.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn visible_lines(&self) -> Range<usize> {
        let item = self.item_height();
        if item <= 0.0 {
            return 0..self.line_count;
        }
        let first = (self.offset_y / item).floor().max(0.0) as usize;
        let last = ((self.offset_y + self.content.height) / item).ceil().max(0.0) as usize;
        first.min(self.line_count)..last.min(self.line_count)
    }

    // ========================================================================
    // Rendering geometry
    // ========================================================================

    /// Rectangle covering `columns` of `line`.
    #[must_use]
    pub fn span_rect(&self, line_text: &str, line: usize, columns: Range<usize>) -> Rect {
        let x0 = self.column_to_pixel(line_text, columns.start);
        let x1 = self.column_to_pixel(line_text, columns.end);
        Rect::new(
            self.content.x + x0 - self.offset_x,
            self.line_top(line),
            (x1 - x0).max(0.0),
            self.line_height,
        )
    }

    /// One-pixel cursor bar at `cursor`.
    #[must_use]
    pub fn cursor_rect(&self, buffer: &TextBuffer, cursor: Position) -> Rect {
        let text = buffer.line_or_empty(cursor.line);
        let x = self.column_to_pixel(&text, cursor.column);
        Rect::new(
            self.content.x + x - self.offset_x,
            self.line_top(cursor.line),
            1.0,
            self.line_height,
        )
    }
}

impl fmt::Debug for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewport")
            .field("content", &self.content)
            .field("offset", &(self.offset_x, self.offset_y))
            .field("needs_v", &self.needs_v)
            .field("needs_h", &self.needs_h)
            .field("visible_items", &self.visible_items)
            .finish_non_exhaustive()
    }
}
