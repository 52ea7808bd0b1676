//! In-process document store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::types::{Document, Filter, Query};
use super::DocumentStore;
use crate::retry::RemoteError;

type Collections = HashMap<String, HashMap<String, Document>>;

/// Document store kept in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert many documents into one collection.
    pub async fn extend(&self, collection: &str, docs: impl IntoIterator<Item = Document>) {
        let mut guard = self.collections.write().await;
        let coll = guard.entry(collection.to_string()).or_default();
        for doc in docs {
            coll.insert(doc.id.clone(), doc);
        }
    }
}

impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError> {
        let guard = self.collections.read().await;
        Ok(guard.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn put(&self, collection: &str, doc: &Document) -> Result<(), RemoteError> {
        let mut guard = self.collections.write().await;
        guard
            .entry(collection.to_string())
            .or_default()
            .insert(doc.id.clone(), doc.clone());
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        let mut guard = self.collections.write().await;
        Ok(guard
            .get_mut(collection)
            .map(|c| c.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, RemoteError> {
        let guard = self.collections.read().await;
        let Some(coll) = guard.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut docs: Vec<Document> = coll
            .values()
            .filter(|d| query.filter.as_ref().map_or(true, |f| f.matches(d)))
            .filter(|d| {
                query
                    .start_after
                    .as_ref()
                    .map_or(true, |c| query.direction.is_after(d, c))
            })
            .cloned()
            .collect();
        docs.sort_by(|a, b| query.direction.compare(a, b));
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> Result<u64, RemoteError> {
        let guard = self.collections.read().await;
        let n = guard
            .get(collection)
            .map(|c| c.values().filter(|d| filter.map_or(true, |f| f.matches(d))).count())
            .unwrap_or(0);
        Ok(n as u64)
    }
}
