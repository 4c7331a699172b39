//! Error types for the snapdir library
//!
//! Errors carry the offending path and the underlying cause wherever one
//! exists, so callers can surface a diagnosable message without digging
//! through layers.

use std::path::PathBuf;
use thiserror::Error;

/// Type alias for Results in the snapdir library
pub type Result<T> = std::result::Result<T, SnapdirError>;

/// Main error type for all snapdir operations
#[derive(Debug, Error)]
pub enum SnapdirError {
    /// Source directory missing or not a directory (precondition failure)
    #[error("Source folder not found: {path:?}")]
    SourceNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// I/O or permission failure while creating or writing the destination
    #[error("Failed to write destination {path:?}: {source}")]
    DestinationWrite {
        /// Path being written when the failure occurred
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Destination artifact already exists (same-day, same-version re-run)
    #[error("Destination already exists: {0:?}")]
    DestinationExists(PathBuf),

    /// Config document unreadable or unwritable
    #[error("Config access failed at {path:?}: {detail}")]
    ConfigAccess {
        /// Path of the backing document
        path: PathBuf,
        /// What went wrong
        detail: String,
    },

    /// Errors during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O errors outside the destination write phase
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Walk directory error from walkdir crate
    #[error("Walk directory error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Archive creation error from the zip crate
    #[error("Archive error: {0}")]
    Archive(String),

    /// Path is not valid UTF-8 and cannot be stored as an archive entry name
    #[error("Path is not valid UTF-8: {0:?}")]
    NonUtf8Path(PathBuf),

    /// Generic error for unexpected conditions
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<zip::result::ZipError> for SnapdirError {
    fn from(err: zip::result::ZipError) -> Self {
        SnapdirError::Archive(err.to_string())
    }
}

impl SnapdirError {
    /// Create a source-not-found error
    pub fn source_not_found(path: impl Into<PathBuf>) -> Self {
        SnapdirError::SourceNotFound { path: path.into() }
    }

    /// Wrap an I/O error that occurred while writing under `path`
    pub fn destination_write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SnapdirError::DestinationWrite {
            path: path.into(),
            source,
        }
    }

    /// Create a config access error
    pub fn config_access(path: impl Into<PathBuf>, detail: impl Into<String>) -> Self {
        SnapdirError::ConfigAccess {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// Create an internal error with a custom message
    pub fn internal(msg: impl Into<String>) -> Self {
        SnapdirError::Internal(msg.into())
    }

    /// Whether this error was raised before any destination-side effect
    pub fn is_precondition(&self) -> bool {
        matches!(self, SnapdirError::SourceNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SnapdirError::source_not_found("/no/such/dir");
        assert!(err.to_string().contains("/no/such/dir"));
    }

    #[test]
    fn test_precondition_classification() {
        assert!(SnapdirError::source_not_found("/x").is_precondition());
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(!SnapdirError::destination_write("/y", io).is_precondition());
    }
}
