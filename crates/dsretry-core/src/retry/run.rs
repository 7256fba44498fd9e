//! Retry loop: run an operation against the client until it succeeds or the
//! attempt budget runs out.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::backoff::{BackoffOutcome, BackoffState};
use super::classify::{classify, CallMode, StoreFailure};
use super::error::RetryError;
use super::policy::{saturating_millis, RetryPolicy};
use super::sleep;
use crate::control::{CallControl, Wake};

/// Executes operations against an injected storage client with retry and backoff.
///
/// The executor itself holds no per-call state; every `execute*` call builds
/// its own [`BackoffState`], so concurrent calls never affect each other.
pub struct RetryExecutor<C> {
    client: Arc<C>,
    policy: RetryPolicy,
}

impl<C> Clone for RetryExecutor<C> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            policy: self.policy,
        }
    }
}

impl<C> RetryExecutor<C> {
    pub fn new(client: C) -> Self {
        Self::with_shared(Arc::new(client))
    }

    /// Use a client that is already shared with other components.
    pub fn with_shared(client: Arc<C>) -> Self {
        Self {
            client,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn client(&self) -> &Arc<C> {
        &self.client
    }

    /// Run a blocking operation, sleeping the calling thread between attempts.
    pub fn execute<T, E, F>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(&C) -> Result<T, E>,
        E: StoreFailure,
    {
        self.run_blocking(None, op)
    }

    /// Like [`execute`](Self::execute), with a control that can interrupt the
    /// backoff sleep or abort the call.
    pub fn execute_with<T, E, F>(&self, control: &CallControl, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(&C) -> Result<T, E>,
        E: StoreFailure,
    {
        self.run_blocking(Some(control), op)
    }

    /// Run a deferred operation. The returned future is the in-flight work;
    /// awaiting it is the join, so completion failures are retried too.
    pub async fn execute_async<T, E, F, Fut>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StoreFailure,
    {
        self.run_deferred(None, op).await
    }

    pub async fn execute_async_with<T, E, F, Fut>(
        &self,
        control: &CallControl,
        op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StoreFailure,
    {
        self.run_deferred(Some(control), op).await
    }

    fn run_blocking<T, E, F>(
        &self,
        control: Option<&CallControl>,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(&C) -> Result<T, E>,
        E: StoreFailure,
    {
        let mut state = BackoffState::new(&self.policy);
        let mut last = None;
        loop {
            if control.is_some_and(CallControl::is_aborted) {
                return Err(aborted(&state, last));
            }
            let err = match op(&self.client) {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let wait = on_failure(&mut state, CallMode::Blocking, err, &mut last)?;
            match sleep::pause_blocking(wait, control) {
                Wake::Elapsed => {}
                Wake::Interrupted => log_interrupted(&state, wait),
                Wake::Aborted => return Err(aborted(&state, last)),
            }
        }
    }

    async fn run_deferred<T, E, F, Fut>(
        &self,
        control: Option<&CallControl>,
        mut op: F,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut(Arc<C>) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: StoreFailure,
    {
        let mut state = BackoffState::new(&self.policy);
        let mut last = None;
        loop {
            if control.is_some_and(CallControl::is_aborted) {
                return Err(aborted(&state, last));
            }
            let err = match op(Arc::clone(&self.client)).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let wait = on_failure(&mut state, CallMode::Deferred, err, &mut last)?;
            match sleep::pause(wait, control).await {
                Wake::Elapsed => {}
                Wake::Interrupted => log_interrupted(&state, wait),
                Wake::Aborted => return Err(aborted(&state, last)),
            }
        }
    }
}

/// Classify a failure and charge it to the budget. Returns the wait before
/// the next attempt, or the terminal error once the budget is spent.
fn on_failure<E: StoreFailure>(
    state: &mut BackoffState,
    mode: CallMode,
    err: E,
    last: &mut Option<E>,
) -> Result<Duration, RetryError<E>> {
    let kind = classify(mode, &err);
    match state.consume_failure(kind.is_timeout()) {
        BackoffOutcome::Exhausted => {
            let attempts = state.attempts_made();
            let cause = std::error::Error::source(&err).map(|s| s.to_string());
            tracing::error!(
                attempts,
                ?kind,
                ?mode,
                cause = cause.as_deref().unwrap_or("none"),
                "no more retries for datastore access: {}",
                err
            );
            Err(RetryError::Exhausted {
                attempts,
                source: err,
            })
        }
        BackoffOutcome::Retry(wait) => {
            tracing::debug!(
                attempt = state.attempts_made(),
                attempts_left = state.attempts_left(),
                wait_ms = saturating_millis(wait),
                ?kind,
                ?mode,
                "datastore call failed, retrying: {}",
                err
            );
            *last = Some(err);
            Ok(wait)
        }
    }
}

fn aborted<E>(state: &BackoffState, last: Option<E>) -> RetryError<E> {
    let attempts = state.attempts_made();
    tracing::info!(attempts, "datastore call aborted");
    RetryError::Aborted { attempts, last }
}

fn log_interrupted(state: &BackoffState, wait: Duration) {
    tracing::debug!(
        attempt = state.attempts_made(),
        wait_ms = saturating_millis(wait),
        "backoff sleep interrupted, retrying now"
    );
}
