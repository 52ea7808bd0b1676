//! `shop delete <collection> <id>`

use anyhow::Result;
use shop_core::catalog::Collection;
use shop_core::store::DocumentStore;

use super::Session;

pub async fn run_delete(session: &Session<'_>, collection: Collection, id: &str) -> Result<()> {
    let removed = session
        .call("delete record", || session.store.delete(collection.as_str(), id))
        .await?;
    match removed {
        Some(true) => println!("Deleted {collection}/{id}"),
        Some(false) => println!("No {collection} record with id {id}"),
        None => {}
    }
    Ok(())
}
