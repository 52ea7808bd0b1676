//! Payment flow state published to the checkout screen.
//!
//! The payment SDK drives the flow through callbacks; the screen observes a
//! `watch` channel. Only `Loading` can move to a terminal state, so a late
//! or duplicated SDK callback cannot overwrite an outcome already shown.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// What the payment provider confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    pub order_id: String,
    #[serde(default)]
    pub payer_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentStatus {
    Idle,
    Loading,
    Success(PaymentReceipt),
    Failure(String),
    Cancelled,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Success(_) | PaymentStatus::Failure(_) | PaymentStatus::Cancelled
        )
    }
}

pub const PAYMENT_TIMED_OUT: &str = "payment timed out";

/// State notifier for one checkout.
#[derive(Debug)]
pub struct PaymentFlow {
    tx: Arc<watch::Sender<PaymentStatus>>,
    timeout: Duration,
    watchdog: Mutex<Option<JoinHandle<()>>>,
}

impl PaymentFlow {
    /// `timeout` bounds how long the flow may stay in `Loading`.
    pub fn new(timeout: Duration) -> Self {
        let (tx, _rx) = watch::channel(PaymentStatus::Idle);
        Self {
            tx: Arc::new(tx),
            timeout,
            watchdog: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PaymentStatus> {
        self.tx.subscribe()
    }

    pub fn status(&self) -> PaymentStatus {
        self.tx.borrow().clone()
    }

    /// Enter `Loading` and arm the timeout watchdog. Must be called inside a
    /// tokio runtime. Returns false if a payment is already in progress.
    pub fn start(&self) -> bool {
        let started = self.tx.send_if_modified(|s| {
            if *s == PaymentStatus::Loading {
                return false;
            }
            *s = PaymentStatus::Loading;
            true
        });
        if !started {
            tracing::debug!("payment already in progress");
            return false;
        }

        let tx = Arc::clone(&self.tx);
        let timeout = self.timeout;
        let watchdog = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let fired = tx.send_if_modified(|s| {
                if *s != PaymentStatus::Loading {
                    return false;
                }
                *s = PaymentStatus::Failure(PAYMENT_TIMED_OUT.to_string());
                true
            });
            if fired {
                tracing::warn!(timeout_secs = timeout.as_secs(), "payment timed out");
            }
        });
        self.replace_watchdog(Some(watchdog));
        true
    }

    pub fn succeed(&self, receipt: PaymentReceipt) -> bool {
        self.finish(PaymentStatus::Success(receipt))
    }

    pub fn fail(&self, reason: impl Into<String>) -> bool {
        self.finish(PaymentStatus::Failure(reason.into()))
    }

    pub fn cancel(&self) -> bool {
        self.finish(PaymentStatus::Cancelled)
    }

    /// Back to `Idle` (e.g. the user left checkout).
    pub fn reset(&self) {
        self.replace_watchdog(None);
        self.tx.send_replace(PaymentStatus::Idle);
    }

    fn finish(&self, next: PaymentStatus) -> bool {
        let label = format!("{:?}", next);
        let changed = self.tx.send_if_modified(move |s| {
            if *s != PaymentStatus::Loading {
                return false;
            }
            *s = next;
            true
        });
        if changed {
            self.replace_watchdog(None);
            tracing::info!(status = %label, "payment finished");
        } else {
            tracing::warn!(status = %label, "ignoring payment callback outside Loading");
        }
        changed
    }

    fn replace_watchdog(&self, next: Option<JoinHandle<()>>) {
        let mut guard = self.watchdog.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(old) = std::mem::replace(&mut *guard, next) {
            old.abort();
        }
    }
}

impl Drop for PaymentFlow {
    fn drop(&mut self) {
        self.replace_watchdog(None);
    }
}
