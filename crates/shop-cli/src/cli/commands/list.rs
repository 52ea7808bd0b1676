//! `shop list <collection>` – one page of a list screen.

use anyhow::Result;
use serde_json::Value;
use shop_core::catalog::Collection;
use shop_core::pagination::{page_count, PageRequest, PageResult};
use shop_core::store::Filter;

use super::Session;

pub async fn run_list(
    session: &Session<'_>,
    collection: Collection,
    filter: Option<Filter>,
    page: usize,
    limit: Option<usize>,
) -> Result<()> {
    let limit = session.page_size(limit);
    let mut pager = session.catalog.paginator(collection);

    let total = pager.total_count(filter.as_ref()).await;
    let result: PageResult<Value> = pager
        .get_page(filter.as_ref(), PageRequest::page(page, limit))
        .await;

    if result.items.is_empty() {
        println!("No {collection} on page {}.", page + 1);
    }
    for item in &result.items {
        println!("{}", serde_json::to_string(item)?);
    }
    println!(
        "page {} of {} ({} total{})",
        page + 1,
        page_count(total, limit).max(1),
        total,
        if result.has_more { ", more available" } else { "" }
    );
    Ok(())
}
