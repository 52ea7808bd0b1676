//! Remote document store capability.
//!
//! The core only needs get/put/delete by id plus an ordered, filtered,
//! bounded query with a start-after cursor. Backends: [`MemoryStore`] and
//! the SQLite-backed [`SqliteStore`].

mod memory;
mod sqlite;
mod types;

use std::future::Future;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::*;

use crate::retry::RemoteError;

/// Document store operations consumed by the pagination and catalog layers.
pub trait DocumentStore: Send + Sync {
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, RemoteError>> + Send;

    /// Insert or replace a document.
    fn put(
        &self,
        collection: &str,
        doc: &Document,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Returns whether a document was removed.
    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<bool, RemoteError>> + Send;

    /// Documents ordered by `(created_at, id)` in `query.direction`.
    fn query(&self, query: &Query) -> impl Future<Output = Result<Vec<Document>, RemoteError>> + Send;

    fn count(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> impl Future<Output = Result<u64, RemoteError>> + Send;
}

impl<S: DocumentStore> DocumentStore for &S {
    fn get(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Document>, RemoteError>> + Send {
        (**self).get(collection, id)
    }

    fn put(
        &self,
        collection: &str,
        doc: &Document,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).put(collection, doc)
    }

    fn delete(
        &self,
        collection: &str,
        id: &str,
    ) -> impl Future<Output = Result<bool, RemoteError>> + Send {
        (**self).delete(collection, id)
    }

    fn query(&self, query: &Query) -> impl Future<Output = Result<Vec<Document>, RemoteError>> + Send {
        (**self).query(query)
    }

    fn count(
        &self,
        collection: &str,
        filter: Option<&Filter>,
    ) -> impl Future<Output = Result<u64, RemoteError>> + Send {
        (**self).count(collection, filter)
    }
}
