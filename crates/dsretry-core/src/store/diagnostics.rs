//! Switchable per-call diagnostics for datastore performance work.

use std::backtrace::Backtrace;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Target for call records, so they can be filtered on their own
/// (e.g. `RUST_LOG=dsretry::perf=warn`).
pub const PERF_TARGET: &str = "dsretry::perf";

/// Shared on/off switch for datastore call logging. Clones share the flag,
/// so it can be flipped at runtime from anywhere holding a clone.
#[derive(Debug, Clone, Default)]
pub struct CallLogging {
    enabled: Arc<AtomicBool>,
}

impl CallLogging {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(enabled)),
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }
}

/// Emit one call record with the operation name and the call-site backtrace.
pub(super) fn trace_call(op: &'static str) {
    let backtrace = Backtrace::force_capture();
    tracing::warn!(target: PERF_TARGET, op, %backtrace, "PERF - {}", op);
}
