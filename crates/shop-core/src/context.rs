//! Application context: process-wide settings built once at startup.
//!
//! Consumers receive an `&AppContext` instead of reaching for globals. It is
//! read-only after construction.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ShopConfig;
use crate::payment::PaymentFlow;
use crate::reachability::{HttpProbe, Reachability};
use crate::retry::{RetryPolicy, RetryScope};

pub struct AppContext {
    config: ShopConfig,
    retry: RetryPolicy,
    reachability: Option<Arc<dyn Reachability>>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("retry", &self.retry)
            .field("reachability", &self.reachability.is_some())
            .finish()
    }
}

impl AppContext {
    /// Build from configuration. The HTTP reachability probe is installed
    /// unless `[reachability] enabled = false`.
    pub fn from_config(config: ShopConfig) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        let reachability = config
            .reachability
            .enabled
            .then(|| Arc::new(HttpProbe::from_config(&config.reachability)) as Arc<dyn Reachability>);
        Self {
            config,
            retry,
            reachability,
        }
    }

    /// Replace the reachability check (`None` disables the pre-check).
    pub fn with_reachability(mut self, reachability: Option<Arc<dyn Reachability>>) -> Self {
        self.reachability = reachability;
        self
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    pub fn reachability(&self) -> Option<&dyn Reachability> {
        self.reachability.as_deref()
    }

    /// Retry scope for one named operation, with the reachability pre-check attached.
    pub fn scope<'a>(&self, name: &'a str) -> RetryScope<'a> {
        let scope = RetryScope::new(name);
        match &self.reachability {
            Some(r) => scope.with_reachability(Arc::clone(r)),
            None => scope,
        }
    }

    pub fn default_page_size(&self) -> usize {
        self.config.default_page_size.max(1)
    }

    pub fn locale(&self) -> Option<&str> {
        self.config.locale.as_deref()
    }

    /// Payment notifier using the configured timeout.
    pub fn payment_flow(&self) -> PaymentFlow {
        PaymentFlow::new(Duration::from_secs(self.config.payment_timeout_secs))
    }
}
