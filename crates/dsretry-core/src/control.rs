//! Per-call control: interrupt the backoff sleep or abort the call.
//!
//! A `CallControl` is handed to one executor call. Another thread or task can
//! `interrupt()` the current sleep (the executor proceeds to the next attempt
//! right away, without spending budget) or `abort()` the call (the executor
//! stops before the next attempt and returns `RetryError::Aborted`).

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::Notify;

/// Why a backoff sleep ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The full wait elapsed.
    Elapsed,
    /// The sleep was interrupted; the pending interrupt is consumed.
    Interrupted,
    /// The call was aborted.
    Aborted,
}

#[derive(Debug, Default)]
struct Flags {
    interrupted: bool,
    aborted: bool,
}

impl Flags {
    fn take_wake(&mut self) -> Option<Wake> {
        if self.aborted {
            return Some(Wake::Aborted);
        }
        if self.interrupted {
            self.interrupted = false;
            return Some(Wake::Interrupted);
        }
        None
    }
}

#[derive(Debug, Default)]
struct Shared {
    flags: Mutex<Flags>,
    cvar: Condvar,
    notify: Notify,
}

/// Cloneable handle; all clones control the same call.
#[derive(Debug, Clone, Default)]
pub struct CallControl {
    shared: Arc<Shared>,
}

impl CallControl {
    pub fn new() -> Self {
        Self::default()
    }

    fn flags(&self) -> MutexGuard<'_, Flags> {
        self.shared
            .flags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn wake_sleepers(&self) {
        self.shared.cvar.notify_all();
        self.shared.notify.notify_waiters();
    }

    /// Cut the current (or next) backoff sleep short. Does not count as a failure.
    pub fn interrupt(&self) {
        self.flags().interrupted = true;
        self.wake_sleepers();
    }

    /// Stop the call before its next attempt. Sticky: cannot be undone.
    pub fn abort(&self) {
        self.flags().aborted = true;
        self.wake_sleepers();
    }

    pub fn is_aborted(&self) -> bool {
        self.flags().aborted
    }

    /// Block the calling thread for `wait` unless interrupted or aborted first.
    ///
    /// A wait too large to express as an instant only ends on a signal.
    pub fn sleep_blocking(&self, wait: Duration) -> Wake {
        let deadline = Instant::now().checked_add(wait);
        let mut flags = self.flags();
        loop {
            if let Some(wake) = flags.take_wake() {
                return wake;
            }
            flags = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Wake::Elapsed;
                    }
                    match self.shared.cvar.wait_timeout(flags, deadline - now) {
                        Ok((guard, _)) => guard,
                        Err(poisoned) => poisoned.into_inner().0,
                    }
                }
                None => self
                    .shared
                    .cvar
                    .wait(flags)
                    .unwrap_or_else(PoisonError::into_inner),
            };
        }
    }

    /// Async counterpart of [`sleep_blocking`](Self::sleep_blocking), on the tokio clock.
    pub async fn sleep(&self, wait: Duration) -> Wake {
        let deadline = tokio::time::Instant::now().checked_add(wait);
        loop {
            let notified = self.shared.notify.notified();
            tokio::pin!(notified);
            // Register before checking the flags so a concurrent wake is not lost.
            notified.as_mut().enable();
            let pending = self.flags().take_wake();
            if let Some(wake) = pending {
                return wake;
            }
            match deadline {
                Some(deadline) => tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => return Wake::Elapsed,
                    _ = &mut notified => {}
                },
                None => notified.await,
            }
        }
    }
}
