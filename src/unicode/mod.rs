//! Unicode display-width helpers used by monospace text measurement.

mod width;

pub use width::{WidthMethod, display_width_char_with_method, display_width_with_method};
