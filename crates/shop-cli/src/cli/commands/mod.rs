//! CLI command handlers, one file per command.

mod completions;
mod count;
mod delete;
mod get;
mod list;
mod probe;
mod put;
mod search;

pub use completions::run_completions;
pub use count::run_count;
pub use delete::run_delete;
pub use get::run_get;
pub use list::run_list;
pub use probe::run_probe;
pub use put::run_put;
pub use search::run_search;

use std::future::Future;

use anyhow::{anyhow, Result};
use shop_core::catalog::Catalog;
use shop_core::context::AppContext;
use shop_core::retry::{cancel_pair, CancelSignal, RemoteError, RetryError, RetryScope};
use shop_core::store::SqliteStore;

/// Everything a store-backed command needs: settings, the opened store and
/// a cancellation scope fired by Ctrl-C.
pub struct Session<'a> {
    pub ctx: &'a AppContext,
    pub store: SqliteStore,
    pub catalog: Catalog<SqliteStore>,
    cancel: CancelSignal,
}

impl<'a> Session<'a> {
    pub async fn open(ctx: &'a AppContext) -> Result<Session<'a>> {
        let store = match &ctx.config().store_path {
            Some(path) => SqliteStore::open_at(path).await?,
            None => SqliteStore::open_default().await?,
        };
        let (handle, cancel) = cancel_pair();
        let catalog = Catalog::new(store.clone())
            .with_retry(*ctx.retry_policy())
            .with_scope(ctx.scope("catalog").with_cancel(cancel.clone()));

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupted, cancelling");
                handle.cancel();
            }
        });

        Ok(Session {
            ctx,
            store,
            catalog,
            cancel,
        })
    }

    /// Page size from the flag, or the configured default.
    pub fn page_size(&self, limit: Option<usize>) -> usize {
        limit.unwrap_or_else(|| self.ctx.default_page_size())
    }

    /// Run one store operation through the retry policy. `Ok(None)` means the
    /// user cancelled and nothing should be reported.
    pub async fn call<T, F, Fut>(&self, name: &str, operation: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RemoteError>>,
    {
        let scope = self.ctx.scope(name).with_cancel(self.cancel.clone());
        match self.ctx.retry_policy().execute(&scope, operation).await {
            Ok(value) => Ok(Some(value)),
            Err(err) => surface(scope, err).map(|()| None),
        }
    }
}

fn surface(scope: RetryScope<'_>, err: RetryError) -> Result<()> {
    match err.user_message() {
        Some(message) => {
            tracing::error!(op = scope.name(), attempts = err.attempts(), "{}", message);
            Err(anyhow!("{}: {}", scope.name(), message))
        }
        None => {
            eprintln!("{}: cancelled", scope.name());
            Ok(())
        }
    }
}
