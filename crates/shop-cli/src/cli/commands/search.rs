//! `shop search <collection> <keyword>`

use anyhow::Result;
use serde_json::Value;
use shop_core::catalog::Collection;
use shop_core::pagination::{page_count, PageRequest, PageResult};

use super::Session;

pub async fn run_search(
    session: &Session<'_>,
    collection: Collection,
    keyword: &str,
    page: usize,
    limit: Option<usize>,
) -> Result<()> {
    let limit = session.page_size(limit);
    let result: PageResult<Value> = session
        .catalog
        .search_by_keyword(collection, keyword, PageRequest::page(page, limit))
        .await;
    if result.items.is_empty() {
        println!("No {collection} matching {keyword:?}.");
        return Ok(());
    }
    for item in &result.items {
        println!("{}", serde_json::to_string(item)?);
    }
    let total = session.catalog.count_by_keyword(collection, keyword).await;
    println!(
        "page {} of {} ({} matches)",
        page + 1,
        page_count(total, limit).max(1),
        total
    );
    Ok(())
}
