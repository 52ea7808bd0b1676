//! Page-index pagination over cursor-only document queries.
//!
//! List screens ask for "page N"; the store can only cheaply "start after
//! record X". [`CursorPaginator`] bridges the two.

mod paginator;


pub use paginator::CursorPaginator;
pub(crate) use paginator::PageError;

/// Requested window: `limit` records after skipping `offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Zero-based page index to offset.
    pub fn page(index: usize, limit: usize) -> Self {
        Self::new(limit, index.saturating_mul(limit))
    }
}

/// One page of records.
///
/// `has_more` is inferred (`items.len() == limit`), not authoritative: a
/// collection whose size is an exact multiple of `limit` reports one more
/// (empty) page. Use a total count when exact page numbers matter.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult<T> {
    pub items: Vec<T>,
    pub has_more: bool,
}

impl<T> PageResult<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
        }
    }

    pub fn from_items(items: Vec<T>, limit: usize) -> Self {
        let has_more = limit > 0 && items.len() == limit;
        Self { items, has_more }
    }
}

impl<T> Default for PageResult<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Number of pages needed for `total` records (`ceil(total / limit)`).
pub fn page_count(total: usize, limit: usize) -> usize {
    if limit == 0 {
        return 0;
    }
    total.div_ceil(limit)
}
