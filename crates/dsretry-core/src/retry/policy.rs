use std::time::Duration;

use crate::config::RetryConfig;

/// Attempt budget for one logical call (including the first attempt).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;
/// Wait applied before the first retry.
pub const DEFAULT_BASE_WAIT: Duration = Duration::from_millis(800);
/// Multiplier applied to the wait after each timeout-classified failure.
pub const DEFAULT_TIMEOUT_FACTOR: u32 = 3;

/// Whole milliseconds in `d`, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Immutable retry parameters shared by every call of an executor.
///
/// Only the starting values live here; the per-call mutable part is
/// [`BackoffState`](super::BackoffState), created fresh by each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first). Always at least 1.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub base_wait: Duration,
    /// Growth factor applied after a timeout-classified failure.
    pub timeout_factor: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_wait: DEFAULT_BASE_WAIT,
            timeout_factor: DEFAULT_TIMEOUT_FACTOR,
        }
    }
}

impl RetryPolicy {
    /// Build a policy, clamping `max_attempts` and `timeout_factor` to at least 1.
    pub fn new(max_attempts: u32, base_wait: Duration, timeout_factor: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_wait,
            timeout_factor: timeout_factor.max(1),
        }
    }

    /// Worst-case total sleep for one call: every failure timeout-classified.
    pub fn worst_case_wait(&self) -> Duration {
        let mut wait = self.base_wait;
        let mut total = Duration::ZERO;
        for _ in 1..self.max_attempts {
            total = total.saturating_add(wait);
            wait = wait.saturating_mul(self.timeout_factor);
        }
        total
    }
}

impl TryFrom<&RetryConfig> for RetryPolicy {
    type Error = anyhow::Error;

    fn try_from(cfg: &RetryConfig) -> anyhow::Result<Self> {
        if cfg.max_attempts == 0 {
            anyhow::bail!("retry.max_attempts must be at least 1");
        }
        if cfg.timeout_factor == 0 {
            anyhow::bail!("retry.timeout_factor must be at least 1");
        }
        Ok(Self::new(
            cfg.max_attempts,
            Duration::from_millis(cfg.base_wait_ms),
            cfg.timeout_factor,
        ))
    }
}
