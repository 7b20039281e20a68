//! Error types for relayout library.

use std::io;
use thiserror::Error;

/// Result type alias for relayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while planning a layout.
///
/// Only whole-document problems are fatal. Fitting a single block never
/// produces an error; it degrades to an overflow plan instead.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading job or configuration files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Job or configuration file is not valid JSON for the expected shape.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The font is not in the catalog, is unavailable, or has no metrics.
    #[error("Font not found: {0}")]
    FontNotFound(String),

    /// The input document graph is malformed.
    #[error("Invalid document structure: {0}")]
    InvalidDocumentStructure(String),

    /// Break opportunities cannot be determined for a character's script.
    #[error("Unsupported script for line breaking: {0:?}")]
    UnsupportedScriptBreak(char),

    /// Engine options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Error while serializing a plan or report.
    #[error("Rendering error: {0}")]
    Render(String),
}

impl Error {
    /// Shorthand for an `InvalidDocumentStructure` error.
    pub(crate) fn structure(reason: impl Into<String>) -> Self {
        Error::InvalidDocumentStructure(reason.into())
    }

    /// Check if this error aborts a job before any page is processed.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::InvalidDocumentStructure(_) | Error::FontNotFound(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::FontNotFound("Arial-Bold".to_string());
        assert_eq!(err.to_string(), "Font not found: Arial-Bold");

        let err = Error::UnsupportedScriptBreak('\u{E000}');
        assert!(err
            .to_string()
            .starts_with("Unsupported script for line breaking"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_structural());
    }

    #[test]
    fn test_structural_errors() {
        assert!(Error::structure("duplicate block id").is_structural());
        assert!(Error::FontNotFound("x".into()).is_structural());
        assert!(!Error::InvalidOptions("min_scale".into()).is_structural());
    }
}
