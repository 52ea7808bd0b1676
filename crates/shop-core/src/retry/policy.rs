use std::time::Duration;

use crate::config::RetryConfig;

/// Default attempt budget (including the first attempt).
pub const MAX_RETRIES: u32 = 4;
/// Default base delay for exponential backoff.
pub const BASE_DELAY: Duration = Duration::from_millis(2000);
/// Default per-attempt timeout.
pub const MAX_TIMEOUT: Duration = Duration::from_millis(20_000);

/// High-level classification of a remote failure for retry purposes.
///
/// Raw collaborator errors are mapped into these kinds by
/// [`classify`](super::classify) before any retry decision is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Reachability pre-check reported no connectivity; nothing was attempted.
    NoNetwork,
    /// An attempt did not finish within the per-attempt timeout.
    Timeout,
    /// DNS or connect failure.
    UnreachableHost,
    /// The user aborted an interactive step (e.g. closed a credential picker).
    UserCancelled,
    /// Anything else. Still retried.
    Other,
}

impl ErrorKind {
    /// `UserCancelled` is terminal; `NoNetwork` never reaches the retry loop.
    pub fn is_retryable(self) -> bool {
        !matches!(self, ErrorKind::UserCancelled | ErrorKind::NoNetwork)
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Stop and surface the failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded exponential backoff with a per-attempt timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for each attempt after that.
    pub base_delay: Duration,
    /// Upper bound on a single attempt.
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RETRIES,
            base_delay: BASE_DELAY,
            attempt_timeout: MAX_TIMEOUT,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts,
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            attempt_timeout: Duration::from_millis(cfg.attempt_timeout_ms),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << shift)
    }

    /// Decide what to do after attempt `attempt` (1-based) failed with `kind`.
    ///
    /// There is never a delay after the final attempt.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() || attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.backoff_delay(attempt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_schedule_is_2_4_8_seconds() {
        let p = RetryPolicy::default();
        assert_eq!(p.backoff_delay(1), Duration::from_millis(2000));
        assert_eq!(p.backoff_delay(2), Duration::from_millis(4000));
        assert_eq!(p.backoff_delay(3), Duration::from_millis(8000));
    }

    #[test]
    fn no_delay_after_last_attempt() {
        let p = RetryPolicy::default();
        for attempt in 1..MAX_RETRIES {
            assert_eq!(
                p.decide(attempt, ErrorKind::Other),
                RetryDecision::RetryAfter(p.backoff_delay(attempt))
            );
        }
        assert_eq!(p.decide(MAX_RETRIES, ErrorKind::Timeout), RetryDecision::NoRetry);
    }

    #[test]
    fn user_cancelled_is_never_retried() {
        let p = RetryPolicy::default();
        assert_eq!(p.decide(1, ErrorKind::UserCancelled), RetryDecision::NoRetry);
    }

    #[test]
    fn huge_attempt_numbers_saturate() {
        let p = RetryPolicy {
            max_attempts: u32::MAX,
            ..RetryPolicy::default()
        };
        let d = p.backoff_delay(u32::MAX);
        assert!(d >= p.backoff_delay(16));
    }

    #[test]
    fn policy_from_config() {
        let cfg = RetryConfig {
            max_attempts: 2,
            base_delay_ms: 100,
            attempt_timeout_ms: 500,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_attempts, 2);
        assert_eq!(p.base_delay, Duration::from_millis(100));
        assert_eq!(p.attempt_timeout, Duration::from_millis(500));
    }
}
