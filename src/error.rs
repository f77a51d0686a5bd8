//! Error types for archlint operations.
//!
//! This module defines [`ArchlintError`], the error type used for failures
//! that stop a run before any report can be produced, and a [`Result`] type
//! alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Findings about document content are never errors here; they are
//!   [`Diagnostic`](crate::validate::Diagnostic)s collected into a report
//! - `ArchlintError` covers input that cannot be read or parsed at all
//! - Use `anyhow::Error` (via `ArchlintError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for archlint operations.
#[derive(Debug, Error)]
pub enum ArchlintError {
    /// Document file not found at the expected location.
    #[error("Document not found: {path}")]
    DocumentNotFound { path: PathBuf },

    /// Document could not be parsed as JSON.
    #[error("Invalid JSON in {source_name}: {message}")]
    DocumentParse {
        source_name: String,
        message: String,
    },

    /// Failed to parse the settings file.
    #[error("Failed to parse settings at {path}: {message}")]
    SettingsParse { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for archlint operations.
pub type Result<T> = std::result::Result<T, ArchlintError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_not_found_displays_path() {
        let err = ArchlintError::DocumentNotFound {
            path: PathBuf::from("knowledge-base/init.json"),
        };
        assert!(err.to_string().contains("knowledge-base/init.json"));
    }

    #[test]
    fn document_parse_displays_source_and_message() {
        let err = ArchlintError::DocumentParse {
            source_name: "<stdin>".into(),
            message: "expected value at line 1 column 1".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("<stdin>"));
        assert!(msg.contains("expected value"));
    }

    #[test]
    fn settings_parse_displays_path_and_message() {
        let err = ArchlintError::SettingsParse {
            path: PathBuf::from(".archlint.yml"),
            message: "invalid type".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains(".archlint.yml"));
        assert!(msg.contains("invalid type"));
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: ArchlintError = io_err.into();
        assert!(matches!(err, ArchlintError::Io(_)));
    }

    #[test]
    fn result_type_alias_works() {
        fn returns_error() -> Result<()> {
            Err(ArchlintError::DocumentNotFound {
                path: PathBuf::from("missing.json"),
            })
        }
        assert!(returns_error().is_err());
    }
}
