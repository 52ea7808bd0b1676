//! `shop get <collection> <id>` – print one record.

use anyhow::{bail, Result};
use serde_json::Value;
use shop_core::catalog::Collection;
use shop_core::store::DocumentStore;

use super::Session;

pub async fn run_get(session: &Session<'_>, collection: Collection, id: &str) -> Result<()> {
    let found = session
        .call("load record", || session.store.get(collection.as_str(), id))
        .await?;
    let doc = match found {
        Some(Some(doc)) => doc,
        Some(None) => bail!("no {} record with id {}", collection, id),
        None => return Ok(()),
    };
    let record: Value = doc.decode()?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
