//! Error types for DeckBuilder.
//!
//! Library crates use [`DeckBuilderError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all DeckBuilder operations.
#[derive(Debug, thiserror::Error)]
pub enum DeckBuilderError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// External converter failure (spawn error or non-zero exit).
    #[error("converter error: {0}")]
    Converter(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (missing artifact, name collision, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DeckBuilderError>;

impl DeckBuilderError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a converter error from any displayable message.
    pub fn converter(msg: impl Into<String>) -> Self {
        Self::Converter(msg.into())
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = DeckBuilderError::config("converter command is empty");
        assert_eq!(err.to_string(), "config error: converter command is empty");

        let err = DeckBuilderError::converter("jupyter nbconvert exited with status 1");
        assert!(err.to_string().contains("exited with status 1"));

        let err = DeckBuilderError::validation("duplicate notebook name 'intro'");
        assert!(err.to_string().contains("duplicate notebook name"));
    }
}
