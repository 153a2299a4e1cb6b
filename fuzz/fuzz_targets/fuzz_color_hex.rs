//! Fuzz target for palette color parsing.
//!
//! Rgba::from_hex and the serde hex form must reject bad input without
//! panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use textcore::color::Rgba;

fuzz_target!(|data: &str| {
    let _ = Rgba::from_hex(data);
    if !data.starts_with('#') {
        let _ = Rgba::from_hex(&format!("#{data}"));
    }

    // Palettes arrive as JSON strings.
    if let Ok(json) = serde_json::to_string(data) {
        let _ = serde_json::from_str::<Rgba>(&json);
    }

    for (i, _) in data.char_indices().take(10) {
        let _ = Rgba::from_hex(&data[i..]);
    }
});
