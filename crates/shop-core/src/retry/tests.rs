//! Retry loop tests (paused tokio clock, so backoff sleeps and timeouts are instant).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use super::*;
use crate::reachability::Fixed;

fn scope() -> RetryScope<'static> {
    RetryScope::new("test op")
}

fn approx(actual: Duration, expected: Duration) -> bool {
    actual >= expected && actual < expected + Duration::from_millis(50)
}

#[tokio::test(start_paused = true)]
async fn retryable_failure_is_attempted_exactly_max_times() {
    let policy = RetryPolicy::default();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RemoteError::Other("boom".into())) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    let err = out.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Other));
    assert_eq!(err.attempts(), 4);
    assert_eq!(
        err.to_string(),
        "Operation failed after 4 attempts. Please try again later."
    );
}

#[tokio::test(start_paused = true)]
async fn timeouts_then_success_follows_backoff_schedule() {
    let policy = RetryPolicy::default();
    let start = Instant::now();
    let seen = Mutex::new(Vec::new());
    let out = run_with_retry(&policy, &scope(), || {
        let mut seen = seen.lock().unwrap();
        seen.push(start.elapsed());
        let attempt = seen.len();
        async move {
            if attempt < 4 {
                Err(RemoteError::Timeout)
            } else {
                Ok("ok")
            }
        }
    })
    .await;

    assert_eq!(out, Ok("ok"));
    let seen = seen.into_inner().unwrap();
    assert_eq!(seen.len(), 4);
    assert!(approx(seen[1] - seen[0], Duration::from_secs(2)));
    assert!(approx(seen[2] - seen[1], Duration::from_secs(4)));
    assert!(approx(seen[3] - seen[2], Duration::from_secs(8)));
}

#[tokio::test(start_paused = true)]
async fn no_network_short_circuits_without_attempting() {
    let policy = RetryPolicy::default();
    let offline = Arc::new(Fixed(false));
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<u32> = policy
        .execute(&scope().with_reachability(offline), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(1) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let err = out.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::NoNetwork));
    assert_eq!(err.attempts(), 0);
    assert!(err.user_message().unwrap().contains("No network connection"));
}

#[tokio::test(start_paused = true)]
async fn online_reachability_lets_the_call_through() {
    let policy = RetryPolicy::default();
    let online = Arc::new(|| true);
    let out = policy
        .execute(&scope().with_reachability(online), || async { Ok(7) })
        .await;
    assert_eq!(out, Ok(7));
}

#[tokio::test(start_paused = true)]
async fn user_cancelled_on_first_attempt_is_terminal() {
    let policy = RetryPolicy::default();
    let start = Instant::now();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RemoteError::UserCancelled("sign-in picker closed".into())) }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
    let err = out.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UserCancelled));
    assert_eq!(err.user_message(), None);
    assert_eq!(err.to_string(), "sign-in picker closed");
}

#[tokio::test(start_paused = true)]
async fn slow_attempts_hit_the_per_attempt_timeout() {
    let policy = RetryPolicy::default();
    let start = Instant::now();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok(())
            }
        })
        .await;

    assert_eq!(calls.load(Ordering::SeqCst), 4);
    let err = out.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Timeout));
    // 4 x 20s timeouts + 2s + 4s + 8s of backoff
    assert!(approx(start.elapsed(), Duration::from_secs(94)));
}

#[tokio::test(start_paused = true)]
async fn last_attempt_classification_wins() {
    let policy = RetryPolicy::default();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope(), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 4 {
                    Err(RemoteError::Timeout)
                } else {
                    Err(RemoteError::UnreachableHost("store.example".into()))
                }
            }
        })
        .await;

    let err = out.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::UnreachableHost));
    assert_eq!(
        err.user_message(),
        Some("Cannot reach server. Please check your internet connection.")
    );
}

#[tokio::test(start_paused = true)]
async fn cancel_fired_inside_an_attempt_stops_it() {
    let policy = RetryPolicy::default();
    let (handle, signal) = cancel_pair();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope().with_cancel(signal), || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n == 2 {
                handle.cancel();
            }
            async { Err(RemoteError::Timeout) }
        })
        .await;

    assert_eq!(out, Err(RetryError::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn caller_cancel_during_backoff_stops_retrying() {
    let policy = RetryPolicy::default();
    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        handle.cancel();
    });
    let start = Instant::now();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope().with_cancel(signal), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RemoteError::Timeout) }
        })
        .await;

    assert_eq!(out, Err(RetryError::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    // Stopped halfway through the 2s backoff, not at its end.
    assert!(approx(start.elapsed(), Duration::from_secs(1)));
}

#[tokio::test(start_paused = true)]
async fn already_cancelled_scope_never_attempts() {
    let policy = RetryPolicy::default();
    let (handle, signal) = cancel_pair();
    handle.cancel();
    let calls = AtomicU32::new(0);
    let out = policy
        .execute(&scope().with_cancel(signal), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
    assert_eq!(out, Err(RetryError::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn operation_reported_cancellation_passes_through() {
    let policy = RetryPolicy::default();
    let calls = AtomicU32::new(0);
    let out: RetryOutcome<()> = policy
        .execute(&scope(), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(RemoteError::Cancelled) }
        })
        .await;
    assert_eq!(out, Err(RetryError::Cancelled));
    assert_eq!(out.unwrap_err().user_message(), None);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn single_attempt_policy_does_not_sleep() {
    let policy = RetryPolicy {
        max_attempts: 1,
        ..RetryPolicy::default()
    };
    let start = Instant::now();
    let out: RetryOutcome<()> = policy
        .execute(&scope(), || async { Err(RemoteError::Timeout) })
        .await;
    assert_eq!(out.unwrap_err().attempts(), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn cancelled_scope_skips_reachability_check() {
    let policy = RetryPolicy::default();
    let (handle, signal) = cancel_pair();
    handle.cancel();
    let checked = Arc::new(AtomicU32::new(0));
    let seen = Arc::clone(&checked);
    let check = Arc::new(move || {
        seen.fetch_add(1, Ordering::SeqCst);
        true
    });
    let out = policy
        .execute(&scope().with_reachability(check).with_cancel(signal), || async { Ok(()) })
        .await;
    assert_eq!(out, Err(RetryError::Cancelled));
    assert_eq!(checked.load(Ordering::SeqCst), 0);
}

// Real clock: the check blocks an OS thread, not the runtime.
#[tokio::test]
async fn slow_reachability_check_does_not_block_the_runtime() {
    let policy = RetryPolicy::default();
    let slow = Arc::new(|| {
        std::thread::sleep(Duration::from_millis(500));
        true
    });
    let (handle, signal) = cancel_pair();
    let ticks = Arc::new(AtomicU32::new(0));
    let ticker = {
        let ticks = Arc::clone(&ticks);
        tokio::spawn(async move {
            loop {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ticks.fetch_add(1, Ordering::SeqCst);
            }
        })
    };
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let start = std::time::Instant::now();
    let calls = AtomicU32::new(0);
    let out = policy
        .execute(&scope().with_reachability(slow).with_cancel(signal), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;
    ticker.abort();

    assert_eq!(out, Err(RetryError::Cancelled));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(start.elapsed() < Duration::from_millis(400));
    assert!(ticks.load(Ordering::SeqCst) > 0);
}
