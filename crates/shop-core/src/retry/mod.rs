//! Retry and backoff policy for remote operations.
//!
//! This module owns the whole failure-handling story for a single remote
//! call: reachability pre-check, per-attempt timeout, error classification
//! and exponential backoff. Callers only ever see a [`RetryOutcome`].

mod cancel;
mod classify;
mod error;
mod policy;
mod run;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use classify::{classify, classify_curl_error, classify_io_error, classify_sqlx_error};
pub use error::{RemoteError, RetryError, RetryOutcome};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::{run_with_retry, RetryScope};

#[cfg(test)]
mod tests;
