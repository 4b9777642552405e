//! Shared error types for the services crate.

use thiserror::Error;

use progress_core::model::SnapshotError;
use storage::repository::StorageError;

/// Failures of the progress subsystem.
///
/// None of these are fatal: reads fall back to defaults, writes are logged,
/// and import failures leave stored progress untouched.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    /// Storage is disabled, full or otherwise unreachable.
    #[error("progress storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// The stored record is not valid JSON or not a JSON object.
    #[error("stored progress is corrupt: {0}")]
    MalformedPersistedData(String),

    /// The imported document is JSON but has the wrong shape.
    #[error("invalid progress file: {0}")]
    ImportValidationFailed(#[from] SnapshotError),

    /// The imported document is not JSON at all.
    #[error("progress file could not be parsed: {0}")]
    ImportParseFailed(String),

    #[error("unsupported file type: {name} (expected a .json file)")]
    UnsupportedFileType { name: String },
}

impl ProgressError {
    /// True for errors caused by user-supplied import input.
    #[must_use]
    pub fn is_import_rejection(&self) -> bool {
        matches!(
            self,
            Self::ImportValidationFailed(_)
                | Self::ImportParseFailed(_)
                | Self::UnsupportedFileType { .. }
        )
    }
}
