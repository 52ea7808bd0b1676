use serde::de::DeserializeOwned;

use super::{PageRequest, PageResult};
use crate::retry::{RemoteError, RetryError, RetryPolicy, RetryScope};
use crate::store::{Cursor, Direction, Document, DocumentStore, Filter, Query};

/// Why a page could not be fetched. Logged, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub(crate) enum PageError {
    #[error(transparent)]
    Store(#[from] RemoteError),
    #[error(transparent)]
    Retry(#[from] RetryError),
}

/// Cursor left behind by the previous page, valid for the next contiguous one.
#[derive(Debug, Clone)]
struct CachedCursor {
    filter: Option<Filter>,
    next_offset: usize,
    cursor: Cursor,
}

/// Translates `(limit, offset)` page requests into start-after queries over
/// one collection, newest first.
///
/// A request at `offset > 0` re-derives its cursor by fetching the first
/// `offset` records and taking the last one, so jumping to page N costs O(N)
/// in the store. Forward paging reuses the cursor of the previous page
/// instead. Two round trips with no snapshot in between: a write landing
/// between them can shift a record across a page boundary.
///
/// Failures never propagate: they are logged and yield an empty page.
#[derive(Debug)]
pub struct CursorPaginator<S> {
    store: S,
    collection: String,
    retry: Option<RetryPolicy>,
    scope: RetryScope<'static>,
    cache: Option<CachedCursor>,
}

impl<S: DocumentStore> CursorPaginator<S> {
    pub fn new(store: S, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            retry: None,
            scope: RetryScope::default(),
            cache: None,
        }
    }

    /// Run every store round trip through `policy`.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Reachability pre-check and cancellation for the retried round trips.
    pub fn with_scope(mut self, scope: RetryScope<'static>) -> Self {
        self.scope = scope;
        self
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Forget the cached cursor (e.g. after the list was edited).
    pub fn reset(&mut self) {
        self.cache = None;
    }

    /// Fetch one page of `filter`-matching records, newest first.
    pub async fn get_page<T: DeserializeOwned>(
        &mut self,
        filter: Option<&Filter>,
        request: PageRequest,
    ) -> PageResult<T> {
        if request.limit == 0 {
            return PageResult::empty();
        }

        let docs = match self.fetch(filter, request).await {
            Ok(docs) => docs,
            Err(e) => {
                tracing::warn!(
                    collection = %self.collection,
                    limit = request.limit,
                    offset = request.offset,
                    "page fetch failed, returning empty page: {}",
                    e
                );
                self.cache = None;
                return PageResult::empty();
            }
        };

        self.cache = docs.last().map(|last| CachedCursor {
            filter: filter.cloned(),
            next_offset: request.offset + docs.len(),
            cursor: last.cursor(),
        });

        let items: Vec<T> = docs
            .iter()
            .filter_map(|doc| match doc.decode::<T>() {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(collection = %self.collection, id = %doc.id, "skipping document: {}", e);
                    None
                }
            })
            .collect();

        tracing::debug!(
            collection = %self.collection,
            limit = request.limit,
            offset = request.offset,
            count = items.len(),
            "fetched page"
        );
        PageResult::from_items(items, request.limit)
    }

    /// Total number of `filter`-matching records; 0 on failure.
    pub async fn total_count(&self, filter: Option<&Filter>) -> usize {
        let store = &self.store;
        let collection = self.collection.as_str();
        let result = match &self.retry {
            None => store.count(collection, filter).await.map_err(PageError::from),
            Some(policy) => policy
                .execute(&self.scope.renamed("count"), || store.count(collection, filter))
                .await
                .map_err(PageError::from),
        };
        match result {
            Ok(n) => n as usize,
            Err(e) => {
                tracing::warn!(collection = %self.collection, "count failed, reporting 0: {}", e);
                0
            }
        }
    }

    async fn fetch(&self, filter: Option<&Filter>, request: PageRequest) -> Result<Vec<Document>, PageError> {
        let base = Query::new(self.collection.clone())
            .filter(filter.cloned())
            .direction(Direction::Descending);

        let start_after = if request.offset == 0 {
            None
        } else if let Some(cursor) = self.cached_cursor(filter, request.offset) {
            tracing::debug!(collection = %self.collection, offset = request.offset, "reusing cached cursor");
            Some(cursor)
        } else {
            let skipped = self.run(base.clone().limit(request.offset)).await?;
            if skipped.len() < request.offset {
                // Requested page starts past the end of the data.
                return Ok(Vec::new());
            }
            skipped.last().map(Document::cursor)
        };

        self.run(base.start_after(start_after).limit(request.limit)).await
    }

    fn cached_cursor(&self, filter: Option<&Filter>, offset: usize) -> Option<Cursor> {
        self.cache
            .as_ref()
            .filter(|c| c.next_offset == offset && c.filter.as_ref() == filter)
            .map(|c| c.cursor.clone())
    }

    async fn run(&self, query: Query) -> Result<Vec<Document>, PageError> {
        let store = &self.store;
        let query = &query;
        match &self.retry {
            None => Ok(store.query(query).await?),
            Some(policy) => Ok(policy
                .execute(&self.scope.renamed("page query"), || store.query(query))
                .await?),
        }
    }
}
