//! Error types for archive decoding and extraction.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ExtractionError`.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Errors that can occur while decoding or extracting an export archive.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-size header record could not be decoded.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A stored name or path field failed to decode cleanly.
    #[error("malformed path: {0}")]
    MalformedPath(String),

    /// Path traversal attempt detected in a stored entry path.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The path that attempted traversal.
        path: PathBuf,
    },
}

impl ExtractionError {
    /// Returns `true` if this error can be handled by skipping one entry.
    ///
    /// Traversal findings and undecodable entry paths are recoverable:
    /// the reader realigns the stream and continues. Header decode
    /// failures and I/O errors are not.
    ///
    /// # Examples
    ///
    /// ```
    /// use exsite_core::ExtractionError;
    /// use std::path::PathBuf;
    ///
    /// let err = ExtractionError::PathTraversal {
    ///     path: PathBuf::from("../etc/passwd"),
    /// };
    /// assert!(err.is_recoverable());
    ///
    /// let err = ExtractionError::InvalidHeader("bad size field".to_string());
    /// assert!(!err.is_recoverable());
    /// ```
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::PathTraversal { .. } | Self::MalformedPath(_))
    }
}
