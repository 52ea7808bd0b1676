//! Storefront collections (users, products, orders, events) on top of the paginator.

mod model;


use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use model::{Event, Order, OrderLine, Product, User};

use crate::pagination::{CursorPaginator, PageError, PageRequest, PageResult};
use crate::retry::{RetryPolicy, RetryScope};
use crate::store::{Document, DocumentStore, Filter, Query};

/// Field every catalog record is filtered on by list screens.
pub const STATUS_FIELD: &str = "status";
/// Owner of an order.
pub const USER_ID_FIELD: &str = "user_id";
/// Kind of promotion ("voucher", "flash sale").
pub const EVENT_TYPE_FIELD: &str = "event_type";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Products,
    Orders,
    Events,
}

impl Collection {
    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::Events => "events",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "users" => Ok(Collection::Users),
            "products" => Ok(Collection::Products),
            "orders" => Ok(Collection::Orders),
            "events" => Ok(Collection::Events),
            other => Err(format!("unknown collection: {}", other)),
        }
    }
}

/// `status = <status>` filter, or no filter.
pub fn status_filter(status: Option<&str>) -> Option<Filter> {
    status.map(|s| Filter::equals(STATUS_FIELD, s))
}

/// Read access to the catalog collections.
#[derive(Debug, Clone)]
pub struct Catalog<S> {
    store: S,
    retry: Option<RetryPolicy>,
    scope: RetryScope<'static>,
}

impl<S: DocumentStore + Clone> Catalog<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            retry: None,
            scope: RetryScope::default(),
        }
    }

    /// Wrap every store round trip (pages, counts, searches) in `policy`.
    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    /// Reachability pre-check and cancellation applied to retried round trips.
    pub fn with_scope(mut self, scope: RetryScope<'static>) -> Self {
        self.scope = scope;
        self
    }

    /// A paginator for one list screen. Keep it for the screen's lifetime so
    /// forward paging can reuse cursors.
    pub fn paginator(&self, collection: Collection) -> CursorPaginator<S> {
        let pager = CursorPaginator::new(self.store.clone(), collection.as_str())
            .with_scope(self.scope.clone());
        match self.retry {
            Some(policy) => pager.with_retry(policy),
            None => pager,
        }
    }

    pub async fn users_page(&self, status: Option<&str>, request: PageRequest) -> PageResult<User> {
        self.page_by(Collection::Users, status_filter(status), request).await
    }

    pub async fn products_page(&self, status: Option<&str>, request: PageRequest) -> PageResult<Product> {
        self.page_by(Collection::Products, status_filter(status), request).await
    }

    pub async fn orders_page(&self, status: Option<&str>, request: PageRequest) -> PageResult<Order> {
        self.page_by(Collection::Orders, status_filter(status), request).await
    }

    pub async fn events_page(&self, status: Option<&str>, request: PageRequest) -> PageResult<Event> {
        self.page_by(Collection::Events, status_filter(status), request).await
    }

    /// Orders placed by one user, newest first.
    pub async fn orders_page_by_user(&self, user_id: &str, request: PageRequest) -> PageResult<Order> {
        let filter = Filter::equals(USER_ID_FIELD, user_id);
        self.page_by(Collection::Orders, Some(filter), request).await
    }

    pub async fn events_page_by_type(&self, event_type: &str, request: PageRequest) -> PageResult<Event> {
        let filter = Filter::equals(EVENT_TYPE_FIELD, event_type);
        self.page_by(Collection::Events, Some(filter), request).await
    }

    /// One page of records matching an arbitrary equality filter.
    pub async fn page_by<T: DeserializeOwned>(
        &self,
        collection: Collection,
        filter: Option<Filter>,
        request: PageRequest,
    ) -> PageResult<T> {
        self.paginator(collection).get_page(filter.as_ref(), request).await
    }

    /// Number of records, optionally restricted to one status; 0 on failure.
    pub async fn count(&self, collection: Collection, status: Option<&str>) -> usize {
        self.count_by(collection, status_filter(status)).await
    }

    pub async fn count_orders_by_user(&self, user_id: &str) -> usize {
        let filter = Filter::equals(USER_ID_FIELD, user_id);
        self.count_by(Collection::Orders, Some(filter)).await
    }

    pub async fn count_events_by_type(&self, event_type: &str) -> usize {
        let filter = Filter::equals(EVENT_TYPE_FIELD, event_type);
        self.count_by(Collection::Events, Some(filter)).await
    }

    /// Number of records matching `filter`; 0 on failure.
    pub async fn count_by(&self, collection: Collection, filter: Option<Filter>) -> usize {
        self.paginator(collection).total_count(filter.as_ref()).await
    }

    /// Case-insensitive substring search over every text field, newest
    /// first, then `offset`/`limit` applied to the matches.
    ///
    /// Scans the whole collection client-side. An empty keyword matches
    /// nothing; failures yield an empty page.
    pub async fn search_by_keyword<T: DeserializeOwned>(
        &self,
        collection: Collection,
        keyword: &str,
        request: PageRequest,
    ) -> PageResult<T> {
        if request.limit == 0 {
            return PageResult::empty();
        }
        let Some(matches) = self.keyword_matches(collection, keyword).await else {
            return PageResult::empty();
        };

        let items: Vec<T> = matches
            .iter()
            .skip(request.offset)
            .take(request.limit)
            .filter_map(|doc| doc.decode().ok())
            .collect();
        tracing::debug!(%collection, keyword, count = items.len(), "keyword search");
        PageResult::from_items(items, request.limit)
    }

    /// Number of records `search_by_keyword` can page through; 0 on failure.
    pub async fn count_by_keyword(&self, collection: Collection, keyword: &str) -> usize {
        self.keyword_matches(collection, keyword)
            .await
            .map_or(0, |matches| matches.len())
    }

    async fn keyword_matches(&self, collection: Collection, keyword: &str) -> Option<Vec<Document>> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        let store = &self.store;
        let query = Query::new(collection.as_str());
        let query = &query;
        let result = match &self.retry {
            None => store.query(query).await.map_err(PageError::from),
            Some(policy) => policy
                .execute(&self.scope.renamed("keyword search"), || store.query(query))
                .await
                .map_err(PageError::from),
        };

        match result {
            Ok(docs) => Some(
                docs.into_iter()
                    .filter(|doc| matches_keyword(doc, &needle))
                    .collect(),
            ),
            Err(e) => {
                tracing::warn!(%collection, "keyword search failed: {}", e);
                None
            }
        }
    }
}

fn matches_keyword(doc: &Document, needle: &str) -> bool {
    doc.fields.values().any(|v| match v {
        Value::String(s) => s.to_lowercase().contains(needle),
        _ => false,
    })
}
