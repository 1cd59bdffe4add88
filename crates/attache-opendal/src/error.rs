//! Blob store error types.

use std::fmt;

/// Result type for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Errors produced by the blob store.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The backend could not be constructed from its configuration.
    #[error("blob store setup failed: {reason}")]
    Setup { reason: String },

    /// No blob is stored under the requested key.
    #[error("no blob stored under key {key:?}")]
    MissingKey { key: String },

    /// The backend refused access to the requested key.
    #[error("access denied for key {key:?}")]
    AccessDenied { key: String },

    /// The backend failed while executing an operation.
    #[error("blob {operation} failed for key {key:?}: {source}")]
    Backend {
        /// Which store operation was running.
        operation: &'static str,
        /// The key the operation targeted.
        key: String,
        /// The underlying OpenDAL failure.
        #[source]
        source: opendal::Error,
    },
}

impl BlobError {
    /// Creates a setup error.
    pub fn setup(reason: impl fmt::Display) -> Self {
        Self::Setup {
            reason: reason.to_string(),
        }
    }

    /// Returns whether this error means the key holds no blob.
    pub fn is_missing_key(&self) -> bool {
        matches!(self, Self::MissingKey { .. })
    }

    /// Classifies an OpenDAL failure for the given operation and key.
    pub(crate) fn from_opendal(operation: &'static str, key: &str, err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::MissingKey {
                key: key.to_owned(),
            },
            ErrorKind::PermissionDenied => Self::AccessDenied {
                key: key.to_owned(),
            },
            _ => Self::Backend {
                operation,
                key: key.to_owned(),
                source: err,
            },
        }
    }
}
