//! Storage-client seams and the retrying convenience layer on top of them.
//!
//! The client itself (keys, entities, wire protocol) lives outside this
//! crate; it only has to implement [`Datastore`] and/or [`AsyncDatastore`].

mod client;
mod diagnostics;
mod error;
mod ops;

pub use client::{AsyncDatastore, Datastore};
pub use diagnostics::{CallLogging, PERF_TARGET};
pub use error::StoreError;
pub use ops::RetryingStore;
