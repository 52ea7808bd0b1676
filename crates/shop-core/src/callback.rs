//! One-shot bridge from callback-style SDKs to an awaited result.
//!
//! External SDKs (social login, payment sheets) report through
//! success/failure/cancel callbacks, sometimes from their own threads and
//! occasionally more than once. [`bridge`] hands out a cloneable
//! [`Completer`] for the callbacks and a [`Pending`] future for the caller;
//! the first completion wins and every later one is rejected.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use crate::retry::RemoteError;

type Slot<T> = Arc<Mutex<Option<oneshot::Sender<Result<T, RemoteError>>>>>;

/// Returned when a callback fires after the bridge was already completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("callback already completed")]
pub struct AlreadyCompleted;

/// Callback side of the bridge.
pub struct Completer<T> {
    slot: Slot<T>,
}

impl<T> Clone for Completer<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T> std::fmt::Debug for Completer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completer")
            .field("completed", &self.is_completed())
            .finish()
    }
}

/// Awaiting side of the bridge.
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<Result<T, RemoteError>>,
}

/// Create a fresh bridge.
pub fn bridge<T>() -> (Completer<T>, Pending<T>) {
    let (tx, rx) = oneshot::channel();
    (
        Completer {
            slot: Arc::new(Mutex::new(Some(tx))),
        },
        Pending { rx },
    )
}

impl<T> Completer<T> {
    pub fn succeed(&self, value: T) -> Result<(), AlreadyCompleted> {
        self.complete(Ok(value))
    }

    pub fn fail(&self, err: impl Into<RemoteError>) -> Result<(), AlreadyCompleted> {
        self.complete(Err(err.into()))
    }

    /// The user dismissed the interactive step. Resolves to
    /// [`RemoteError::UserCancelled`], which the retry loop treats as terminal.
    pub fn cancel(&self, reason: impl Into<String>) -> Result<(), AlreadyCompleted> {
        self.complete(Err(RemoteError::UserCancelled(reason.into())))
    }

    pub fn is_completed(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    fn complete(&self, result: Result<T, RemoteError>) -> Result<(), AlreadyCompleted> {
        let sender = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match sender {
            Some(tx) => {
                // The waiter may have given up; completion still counts.
                let _ = tx.send(result);
                Ok(())
            }
            None => {
                tracing::warn!("callback invoked after completion; ignoring");
                Err(AlreadyCompleted)
            }
        }
    }
}

impl<T> Pending<T> {
    /// Wait for the first completion. Resolves to an error if every
    /// completer is dropped without completing.
    pub async fn wait(self) -> Result<T, RemoteError> {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Other(
                "callback dropped without completing".to_string(),
            )),
        }
    }
}
