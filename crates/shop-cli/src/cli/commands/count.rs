//! `shop count <collection> [--status S | --user ID | --event-type T]`

use anyhow::Result;
use shop_core::catalog::Collection;
use shop_core::store::Filter;

use super::Session;

pub async fn run_count(session: &Session<'_>, collection: Collection, filter: Option<Filter>) -> Result<()> {
    let described = filter
        .as_ref()
        .map(|f| format!(" with {} = {}", f.field, f.value))
        .unwrap_or_default();
    let total = session.catalog.count_by(collection, filter).await;
    println!("{total} {collection}{described}");
    Ok(())
}
