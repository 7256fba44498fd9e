//! Classify datastore failures into retry kinds.

/// Implemented by a storage client's error type so the executor can tell
/// deadline failures apart from everything else.
pub trait StoreFailure: std::error::Error + Send + Sync + 'static {
    /// The backend gave up waiting (deadline exceeded, request timeout).
    fn is_deadline_exceeded(&self) -> bool;

    /// Waiting on in-flight work was interrupted before it completed.
    fn is_interrupted(&self) -> bool {
        false
    }
}

/// How an operation is executed; affects how interruption is classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    /// The operation runs to completion on the calling thread.
    Blocking,
    /// The operation yields in-flight work that is joined before success.
    Deferred,
}

/// Retry classification of a failed attempt. Both kinds are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Deadline-like failure; grows the wait for later retries.
    Timeout,
    /// Any other failure; retried with the current wait unchanged.
    Transient,
}

impl FailureKind {
    pub fn is_timeout(self) -> bool {
        self == FailureKind::Timeout
    }
}

/// Classify a failure. A stalled join in deferred mode counts as a timeout;
/// in blocking mode interruption is an ordinary transient failure.
pub fn classify<E: StoreFailure>(mode: CallMode, err: &E) -> FailureKind {
    if err.is_deadline_exceeded() {
        return FailureKind::Timeout;
    }
    match mode {
        CallMode::Deferred if err.is_interrupted() => FailureKind::Timeout,
        _ => FailureKind::Transient,
    }
}
