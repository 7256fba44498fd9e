//! Retry and backoff for datastore calls.
//!
//! Each executor call owns a fresh [`BackoffState`]: a fixed attempt budget
//! and a wait that only grows after timeout-classified failures. Failures
//! are never treated as permanent; every error is retried until the budget
//! runs out and then surfaces as [`RetryError::Exhausted`].

mod backoff;
mod classify;
mod error;
mod policy;
mod run;
mod sleep;

pub use backoff::{BackoffOutcome, BackoffState};
pub use classify::{classify, CallMode, FailureKind, StoreFailure};
pub use error::RetryError;
pub(crate) use policy::saturating_millis;
pub use policy::RetryPolicy;
pub use run::RetryExecutor;
