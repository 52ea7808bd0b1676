//! Network reachability pre-check.
//!
//! A cheap, best-effort test performed before a remote call. "Available"
//! does not guarantee the call succeeds; "unavailable" lets the retry loop
//! skip a doomed operation entirely.

use std::time::Duration;

use crate::config::ReachabilityConfig;

/// Synchronous connectivity check.
pub trait Reachability: Send + Sync {
    fn is_network_available(&self) -> bool;
}

impl<F> Reachability for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_network_available(&self) -> bool {
        self()
    }
}

/// Reachability with a fixed answer (tests, offline mode).
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub bool);

impl Reachability for Fixed {
    fn is_network_available(&self) -> bool {
        self.0
    }
}

/// Probes a well-known URL with a HEAD request; any HTTP response counts as online.
///
/// Blocks the calling thread for up to `connect_timeout` (plus the same
/// again for the response). The retry loop runs it on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    url: String,
    connect_timeout: Duration,
}

impl HttpProbe {
    pub fn new(url: impl Into<String>, connect_timeout: Duration) -> Self {
        Self {
            url: url.into(),
            connect_timeout,
        }
    }

    pub fn from_config(cfg: &ReachabilityConfig) -> Self {
        Self::new(
            cfg.probe_url.clone(),
            Duration::from_millis(cfg.connect_timeout_ms),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform the HEAD request and return the HTTP status code.
    pub fn probe(&self) -> Result<u32, curl::Error> {
        let mut easy = curl::easy::Easy::new();
        easy.url(&self.url)?;
        easy.nobody(true)?; // HEAD request
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.connect_timeout.saturating_mul(2))?;
        easy.perform()?;
        easy.response_code()
    }
}

impl Reachability for HttpProbe {
    fn is_network_available(&self) -> bool {
        match self.probe() {
            Ok(code) => {
                tracing::debug!(url = %self.url, code, "reachability probe answered");
                true
            }
            Err(e) => {
                tracing::debug!(url = %self.url, "reachability probe failed: {}", e);
                false
            }
        }
    }
}
