//! Terminal errors returned by the retry executor.

use thiserror::Error;

/// Why a retried call gave up. `E` is the storage client's error type.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed; `source` is the last failure.
    #[error("no more retries for datastore access after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: E,
    },
    /// The call's [`CallControl`](crate::control::CallControl) was aborted.
    #[error("datastore call aborted after {attempts} attempts")]
    Aborted {
        attempts: u32,
        #[source]
        last: Option<E>,
    },
}

impl<E> RetryError<E> {
    /// Number of attempts that were made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Aborted { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, RetryError::Exhausted { .. })
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RetryError::Aborted { .. })
    }

    /// The most recent underlying failure, if any attempt failed.
    pub fn last_failure(&self) -> Option<&E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { last, .. } => last.as_ref(),
        }
    }

    pub fn into_last_failure(self) -> Option<E> {
        match self {
            RetryError::Exhausted { source, .. } => Some(source),
            RetryError::Aborted { last, .. } => last,
        }
    }
}
