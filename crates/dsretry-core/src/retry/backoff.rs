//! Per-call backoff bookkeeping: remaining attempts and the current wait.

use std::time::Duration;

use super::policy::RetryPolicy;

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffOutcome {
    /// Sleep for the given duration, then attempt again.
    Retry(Duration),
    /// Attempt budget used up; the call must fail.
    Exhausted,
}

/// Mutable retry state scoped to a single logical call. Never shared.
#[derive(Debug, Clone)]
pub struct BackoffState {
    max_attempts: u32,
    attempts_left: u32,
    wait: Duration,
    timeout_factor: u32,
}

impl BackoffState {
    pub fn new(policy: &RetryPolicy) -> Self {
        Self {
            max_attempts: policy.max_attempts,
            attempts_left: policy.max_attempts,
            wait: policy.base_wait,
            timeout_factor: policy.timeout_factor,
        }
    }

    /// Record one failed attempt.
    ///
    /// The returned wait is the value accumulated so far; growth from a
    /// timeout only applies to the retry after this one.
    pub fn consume_failure(&mut self, is_timeout: bool) -> BackoffOutcome {
        self.attempts_left = self.attempts_left.saturating_sub(1);
        if self.attempts_left == 0 {
            return BackoffOutcome::Exhausted;
        }

        let wait = self.wait;
        if is_timeout {
            self.wait = self.wait.saturating_mul(self.timeout_factor);
        }
        BackoffOutcome::Retry(wait)
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    /// Number of failures recorded so far.
    pub fn attempts_made(&self) -> u32 {
        self.max_attempts - self.attempts_left
    }

    /// Wait that the next retry would use.
    pub fn current_wait(&self) -> Duration {
        self.wait
    }
}
