//! Ready-made error type for storage clients.

use thiserror::Error;

use crate::retry::StoreFailure;

/// Failure reported by a storage client call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backend deadline passed before the call finished.
    #[error("datastore deadline exceeded: {0}")]
    DeadlineExceeded(String),
    /// Waiting on in-flight work was interrupted.
    #[error("interrupted while waiting for datastore")]
    Interrupted,
    /// Concurrent modification or contention on the backend.
    #[error("datastore contention: {0}")]
    Contention(String),
    /// Anything else the backend rejected (bad request, permission, ...).
    #[error("datastore backend error: {0}")]
    Backend(String),
}

impl StoreFailure for StoreError {
    fn is_deadline_exceeded(&self) -> bool {
        matches!(self, StoreError::DeadlineExceeded(_))
    }

    fn is_interrupted(&self) -> bool {
        matches!(self, StoreError::Interrupted)
    }
}
