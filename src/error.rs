//! Error types for textcore.
//!
//! Editing never fails: out-of-range positions are clamped. Errors only come
//! from loading configuration and language definitions.

use std::fmt;
use std::io;

/// Result type alias for textcore operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for textcore operations.
#[derive(Debug)]
pub enum Error {
    /// I/O error while reading a definition file.
    Io(io::Error),
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Malformed JSON for a config or language definition.
    Json(serde_json::Error),
    /// Language definition failed validation.
    InvalidLanguage { name: String, reason: String },
    /// Language index outside the registry.
    LanguageIndexOutOfRange { index: usize, count: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::InvalidLanguage { name, reason } => {
                write!(f, "invalid language definition '{name}': {reason}")
            }
            Self::LanguageIndexOutOfRange { index, count } => {
                write!(
                    f,
                    "language index {index} out of range for {count} registered languages"
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
