//! Custom error types for bak-archiver
//!
//! Only run-fatal conditions are errors. Per-file problems (unreadable file
//! while hashing, failed deletion, entries skipped during enumeration) are
//! recorded in the manifest or in counters and never surface here.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for archive runs
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// The scan root is missing or not a directory
    #[error("Root directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// The destination archive (or its parent directory) cannot be created
    #[error("Destination is not writable: {}: {reason}", path.display())]
    DestinationUnwritable { path: PathBuf, reason: String },

    /// Writing a batch or the embedded manifest into the archive failed
    #[error("Failed to write archive: {0}")]
    ArchiveWrite(String),

    /// Writing the CSV manifest failed
    #[error("Manifest export error: {0}")]
    ManifestExport(String),

    /// The finished archive does not match the manifest
    #[error("Archive verification failed: {0}")]
    Verification(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid configuration values
    #[error("Validation error: {0}")]
    Validation(String),

    /// Reading an interactive answer failed
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

impl ArchiveError {
    /// Create a "destination unwritable" error
    pub fn destination(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::DestinationUnwritable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for ArchiveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ArchiveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<zip::result::ZipError> for ArchiveError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::ArchiveWrite(err.to_string())
    }
}

impl From<csv::Error> for ArchiveError {
    fn from(err: csv::Error) -> Self {
        Self::ManifestExport(err.to_string())
    }
}

/// Result type alias for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
