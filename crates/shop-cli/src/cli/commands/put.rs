//! `shop put <collection> <id> <json>` – insert or replace a record.

use anyhow::{Context, Result};
use serde_json::Value;
use shop_core::catalog::Collection;
use shop_core::store::{now_millis, Document, DocumentStore};

use super::Session;

/// Parse the record body. Must be a JSON object.
pub(crate) fn parse_record(id: &str, json: &str, created_at: Option<i64>) -> Result<Document> {
    let value: Value = serde_json::from_str(json).context("parsing record JSON")?;
    let doc = Document::from_json(id, created_at.unwrap_or_else(now_millis), value)?;
    Ok(doc)
}

pub async fn run_put(
    session: &Session<'_>,
    collection: Collection,
    id: &str,
    json: &str,
    created_at: Option<i64>,
) -> Result<()> {
    let doc = parse_record(id, json, created_at)?;
    let saved = session
        .call("save record", || session.store.put(collection.as_str(), &doc))
        .await?;
    if saved.is_some() {
        println!("Saved {collection}/{id}");
    }
    Ok(())
}
