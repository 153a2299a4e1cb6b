//! Keyboard input types consumed by the editing core.

mod keyboard;

pub use keyboard::{KeyCode, KeyEvent, KeyModifiers};
