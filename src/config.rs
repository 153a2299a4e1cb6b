//! Widget configuration.
//!
//! [`EditorConfig`] is the serializable form; [`EditFlags`] is the compact
//! set of editing switches the engine consults on every keystroke.

use crate::error::Result;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::time::Duration;

bitflags! {
    /// Editing behavior switches.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EditFlags: u8 {
        /// Line-jump left stops after leading spaces first.
        const INDENT_AWARE_NAVIGATION = 0b0000_0001;
        /// Backspace removes a whole indentation unit of spaces.
        const INDENT_AWARE_BACKSPACE = 0b0000_0010;
        /// Enter copies the leading spaces of the split line.
        const MIRROR_INDENT = 0b0000_0100;
        /// Enter after a trailing `{` adds one more indentation unit.
        const EXTRA_INDENT_ON_OPEN_BRACE = 0b0000_1000;
        /// Bulk inserts drop leading spaces of their first segment.
        const STRIP_LEADING_SPACES_ON_INSERT = 0b0001_0000;
        /// Text cannot be modified through the widget.
        const READ_ONLY = 0b0010_0000;
    }
}

/// Widget configuration, loadable from JSON.
///
/// Missing fields take their defaults, so `{}` is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spaces per indentation unit.
    pub indent_width: usize,
    pub indent_aware_navigation: bool,
    pub indent_aware_backspace: bool,
    pub mirror_indent: bool,
    pub extra_indent_on_open_brace: bool,
    pub strip_leading_spaces_on_insert: bool,
    pub read_only: bool,
    /// Cursor blink half-period.
    pub blink_interval_ms: u64,
    /// Idle time after which a multi-line widget commits on its own.
    pub auto_commit_delay_ms: u64,
    /// Window in which a press after a double click selects the line.
    pub multi_click_ms: u64,
    /// Extra pixels between lines.
    pub line_spacing: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            indent_aware_navigation: false,
            indent_aware_backspace: false,
            mirror_indent: false,
            extra_indent_on_open_brace: false,
            strip_leading_spaces_on_insert: true,
            read_only: false,
            blink_interval_ms: 500,
            auto_commit_delay_ms: 1000,
            multi_click_ms: 300,
            line_spacing: 0,
        }
    }
}

impl EditorConfig {
    /// Preset for single-line fields.
    #[must_use]
    pub fn line_edit() -> Self {
        Self::default()
    }

    /// Preset for plain multi-line text areas.
    #[must_use]
    pub fn text_edit() -> Self {
        Self::default()
    }

    /// Preset for code editors: indentation-aware everything.
    #[must_use]
    pub fn code_edit() -> Self {
        Self {
            indent_aware_navigation: true,
            indent_aware_backspace: true,
            mirror_indent: true,
            extra_indent_on_open_brace: true,
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder: set read-only.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Builder: set indentation width.
    #[must_use]
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Collapse the boolean switches into [`EditFlags`].
    #[must_use]
    pub fn flags(&self) -> EditFlags {
        let mut flags = EditFlags::empty();
        flags.set(
            EditFlags::INDENT_AWARE_NAVIGATION,
            self.indent_aware_navigation,
        );
        flags.set(EditFlags::INDENT_AWARE_BACKSPACE, self.indent_aware_backspace);
        flags.set(EditFlags::MIRROR_INDENT, self.mirror_indent);
        flags.set(
            EditFlags::EXTRA_INDENT_ON_OPEN_BRACE,
            self.extra_indent_on_open_brace,
        );
        flags.set(
            EditFlags::STRIP_LEADING_SPACES_ON_INSERT,
            self.strip_leading_spaces_on_insert,
        );
        flags.set(EditFlags::READ_ONLY, self.read_only);
        flags
    }

    #[must_use]
    pub fn blink_interval(&self) -> Duration {
        Duration::from_millis(self.blink_interval_ms)
    }

    #[must_use]
    pub fn auto_commit_delay(&self) -> Duration {
        Duration::from_millis(self.auto_commit_delay_ms)
    }

    #[must_use]
    pub fn multi_click_window(&self) -> Duration {
        Duration::from_millis(self.multi_click_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.indent_width, 4);
        assert_eq!(config.blink_interval(), Duration::from_millis(500));
        assert_eq!(
            config.flags(),
            EditFlags::STRIP_LEADING_SPACES_ON_INSERT
        );
    }

    #[test]
    fn test_code_edit_preset_flags() {
        let flags = EditorConfig::code_edit().flags();
        assert!(flags.contains(
            EditFlags::INDENT_AWARE_NAVIGATION
                | EditFlags::INDENT_AWARE_BACKSPACE
                | EditFlags::MIRROR_INDENT
                | EditFlags::EXTRA_INDENT_ON_OPEN_BRACE
        ));
        assert!(!flags.contains(EditFlags::READ_ONLY));
    }

    #[test]
    fn test_from_json_partial() {
        let config = EditorConfig::from_json(r#"{"indent_width": 2, "read_only": true}"#).unwrap();
        assert_eq!(config.indent_width, 2);
        assert!(config.flags().contains(EditFlags::READ_ONLY));
        assert_eq!(config.multi_click_ms, 300);
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(EditorConfig::from_json("[1, 2").is_err());
    }
}
