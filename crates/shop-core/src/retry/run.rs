//! Retry loop: run an async operation until success or the policy says stop.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use super::cancel::CancelSignal;
use super::classify;
use super::error::{RemoteError, RetryError, RetryOutcome};
use super::policy::{RetryDecision, RetryPolicy};
use crate::reachability::Reachability;

/// Per-call context for [`run_with_retry`]: a name for logs, an optional
/// reachability pre-check and an optional cancellation scope.
#[derive(Clone, Default)]
pub struct RetryScope<'a> {
    name: &'a str,
    reachability: Option<Arc<dyn Reachability>>,
    cancel: Option<CancelSignal>,
}

impl fmt::Debug for RetryScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryScope")
            .field("name", &self.name)
            .field("reachability", &self.reachability.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl<'a> RetryScope<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            reachability: None,
            cancel: None,
        }
    }

    /// Check connectivity before the first attempt. The check runs on the
    /// blocking pool, so it may do network I/O.
    pub fn with_reachability(mut self, reachability: Arc<dyn Reachability>) -> Self {
        self.reachability = Some(reachability);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Same pre-check and cancellation, different log name.
    pub fn renamed<'b>(&self, name: &'b str) -> RetryScope<'b> {
        RetryScope {
            name,
            reachability: self.reachability.clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelSignal::is_cancelled)
    }
}

impl RetryPolicy {
    /// Run `operation` under this policy. See [`run_with_retry`].
    pub async fn execute<T, F, Fut>(&self, scope: &RetryScope<'_>, operation: F) -> RetryOutcome<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        run_with_retry(self, scope, operation).await
    }
}

/// Runs `operation` until it succeeds or the retry policy says to stop.
///
/// Each attempt is bounded by `policy.attempt_timeout`. Between failed
/// attempts the loop sleeps for the policy's backoff delay. A failed
/// reachability pre-check returns `NoNetwork` without calling `operation`.
/// Caller cancellation (the scope's signal, or the operation returning
/// [`RemoteError::Cancelled`]) returns [`RetryError::Cancelled`] at once.
pub async fn run_with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    scope: &RetryScope<'_>,
    mut operation: F,
) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RemoteError>>,
{
    if scope.is_cancelled() {
        return Err(RetryError::Cancelled);
    }

    let mut cancel = scope.cancel.clone();
    if let Some(reachability) = scope.reachability.clone() {
        let check = tokio::task::spawn_blocking(move || reachability.is_network_available());
        match until_cancelled(cancel.as_mut(), check).await {
            None => {
                tracing::debug!(op = scope.name, "cancelled during reachability check");
                return Err(RetryError::Cancelled);
            }
            Some(Ok(true)) => {}
            Some(Ok(false)) => {
                tracing::warn!(op = scope.name, "no network connection; not attempting");
                return Err(RetryError::no_network());
            }
            // Best effort: a panicking check does not block the call.
            Some(Err(e)) => tracing::warn!(op = scope.name, "reachability check failed: {}", e),
        }
    }

    let mut attempt = 1u32;
    loop {
        if scope.is_cancelled() {
            tracing::debug!(op = scope.name, attempt, "cancelled before attempt");
            return Err(RetryError::Cancelled);
        }
        let attempt_fut = tokio::time::timeout(policy.attempt_timeout, operation());
        let err = match until_cancelled(cancel.as_mut(), attempt_fut).await {
            None | Some(Ok(Err(RemoteError::Cancelled))) => {
                tracing::debug!(op = scope.name, attempt, "cancelled by caller");
                return Err(RetryError::Cancelled);
            }
            Some(Ok(Ok(value))) => {
                if attempt > 1 {
                    tracing::debug!(op = scope.name, attempt, "succeeded after retry");
                }
                return Ok(value);
            }
            Some(Ok(Err(e))) => e,
            Some(Err(_elapsed)) => RemoteError::Timeout,
        };

        let kind = classify::classify(&err);
        tracing::warn!(
            op = scope.name,
            attempt,
            max_attempts = policy.max_attempts,
            ?kind,
            "attempt failed: {}",
            err
        );

        match policy.decide(attempt, kind) {
            RetryDecision::NoRetry => return Err(RetryError::classified(kind, &err, attempt)),
            RetryDecision::RetryAfter(delay) => {
                let sleep = tokio::time::sleep(delay);
                if until_cancelled(cancel.as_mut(), sleep).await.is_none() {
                    tracing::debug!(op = scope.name, attempt, "cancelled during backoff");
                    return Err(RetryError::Cancelled);
                }
                attempt += 1;
            }
        }
    }
}

/// Drive `fut` to completion unless `signal` fires first (`None`).
async fn until_cancelled<F: Future>(signal: Option<&mut CancelSignal>, fut: F) -> Option<F::Output> {
    match signal {
        None => Some(fut.await),
        Some(signal) => {
            tokio::select! {
                biased;
                _ = signal.cancelled() => None,
                out = fut => Some(out),
            }
        }
    }
}
