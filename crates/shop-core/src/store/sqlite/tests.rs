//! Tests for the SQLite store (in-memory database).

use serde_json::json;

use super::SqliteStore;
use crate::store::{Direction, Document, DocumentStore, Filter, Query};

fn doc(id: &str, ts: i64, body: serde_json::Value) -> Document {
    Document::from_json(id, ts, body).unwrap()
}

async fn seeded() -> SqliteStore {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let rows = [
        ("p1", 100, json!({ "name": "Tea", "status": "active", "stock": 3, "featured": true })),
        ("p2", 200, json!({ "name": "Mug", "status": "hidden", "stock": 0, "featured": false })),
        ("p3", 200, json!({ "name": "Pot", "status": "active", "stock": 3, "featured": false })),
        ("p4", 300, json!({ "name": "Cup", "status": "active", "stock": 9 })),
    ];
    for (id, ts, body) in rows {
        store.put("products", &doc(id, ts, body)).await.unwrap();
    }
    store
}

fn ids(docs: &[Document]) -> Vec<&str> {
    docs.iter().map(|d| d.id.as_str()).collect()
}

#[tokio::test]
async fn query_orders_by_created_at_then_id_descending() {
    let store = seeded().await;
    let docs = store.query(&Query::new("products")).await.unwrap();
    assert_eq!(ids(&docs), vec!["p4", "p3", "p2", "p1"]);

    let asc = store
        .query(&Query::new("products").direction(Direction::Ascending))
        .await
        .unwrap();
    assert_eq!(ids(&asc), vec!["p1", "p2", "p3", "p4"]);
}

#[tokio::test]
async fn start_after_cursor_handles_equal_timestamps() {
    let store = seeded().await;
    let first = store.query(&Query::new("products").limit(2)).await.unwrap();
    assert_eq!(ids(&first), vec!["p4", "p3"]);

    let cursor = first.last().map(Document::cursor);
    let rest = store
        .query(&Query::new("products").start_after(cursor).limit(10))
        .await
        .unwrap();
    assert_eq!(ids(&rest), vec!["p2", "p1"]);
}

#[tokio::test]
async fn filters_on_strings_numbers_and_bools() {
    let store = seeded().await;
    let active = Filter::equals("status", "active");
    let docs = store
        .query(&Query::new("products").filter(Some(active.clone())))
        .await
        .unwrap();
    assert_eq!(ids(&docs), vec!["p4", "p3", "p1"]);
    assert_eq!(store.count("products", Some(&active)).await.unwrap(), 3);

    let stock3 = Filter::equals("stock", 3);
    assert_eq!(store.count("products", Some(&stock3)).await.unwrap(), 2);

    let featured = Filter::equals("featured", true);
    let docs = store
        .query(&Query::new("products").filter(Some(featured)))
        .await
        .unwrap();
    assert_eq!(ids(&docs), vec!["p1"]);

    let unset = Filter::equals("featured", serde_json::Value::Null);
    assert_eq!(store.count("products", Some(&unset)).await.unwrap(), 1);
}

#[tokio::test]
async fn non_scalar_filter_is_rejected() {
    let store = seeded().await;
    let bad = Filter::equals("tags", json!(["a"]));
    assert!(store.count("products", Some(&bad)).await.is_err());
}

#[tokio::test]
async fn put_replaces_and_delete_removes() {
    let store = seeded().await;
    store
        .put("products", &doc("p2", 250, json!({ "name": "Mug v2", "status": "active" })))
        .await
        .unwrap();
    let p2 = store.get("products", "p2").await.unwrap().expect("exists");
    assert_eq!(p2.created_at, 250);
    assert_eq!(p2.fields["name"], "Mug v2");
    assert_eq!(store.count("products", None).await.unwrap(), 4);

    assert!(store.delete("products", "p2").await.unwrap());
    assert!(!store.delete("products", "p2").await.unwrap());
    assert!(store.get("products", "p2").await.unwrap().is_none());
}

#[tokio::test]
async fn collections_are_isolated() {
    let store = seeded().await;
    store
        .put("users", &doc("p1", 1, json!({ "username": "ann" })))
        .await
        .unwrap();
    assert_eq!(store.count("users", None).await.unwrap(), 1);
    assert_eq!(store.count("products", None).await.unwrap(), 4);
    let user = store.get("users", "p1").await.unwrap().unwrap();
    assert_eq!(user.fields["username"], "ann");
}
