//! Types shared by document store backends.

use std::cmp::Ordering;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::retry::RemoteError;

/// Unix timestamp in milliseconds.
pub type Millis = i64;

/// A stored record: identifier, creation timestamp and free-form fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub created_at: Millis,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, created_at: Millis, fields: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            created_at,
            fields,
        }
    }

    /// Document stamped with the current time.
    pub fn now(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self::new(id, now_millis(), fields)
    }

    /// Build a document from a JSON object. Non-object values are rejected.
    pub fn from_json(id: impl Into<String>, created_at: Millis, value: Value) -> Result<Self, RemoteError> {
        match value {
            Value::Object(fields) => Ok(Self::new(id, created_at, fields)),
            other => Err(RemoteError::Decode(format!(
                "document body must be a JSON object, got {}",
                other
            ))),
        }
    }

    /// Decode into a typed record. `id` and `created_at` are injected into the
    /// field map (unless a field of that name already exists) so records can
    /// carry them as ordinary struct fields.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, RemoteError> {
        let mut fields = self.fields.clone();
        fields
            .entry("id".to_string())
            .or_insert_with(|| Value::String(self.id.clone()));
        fields
            .entry("created_at".to_string())
            .or_insert_with(|| Value::from(self.created_at));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Position of this document in `(created_at, id)` order.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            created_at: self.created_at,
            id: self.id.clone(),
        }
    }
}

/// Opaque start-after marker: the last record of a previously fetched page.
///
/// Only meaningful for further queries with the same collection, filter and
/// ordering it was obtained under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    created_at: Millis,
    id: String,
}

impl Cursor {
    pub fn created_at(&self) -> Millis {
        self.created_at
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn key(&self) -> (Millis, &str) {
        (self.created_at, self.id.as_str())
    }
}

/// Sort direction on `created_at` (ties broken by `id` in the same direction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

impl Direction {
    /// Compare two documents in this direction.
    pub fn compare(self, a: &Document, b: &Document) -> Ordering {
        let ord = (a.created_at, a.id.as_str()).cmp(&(b.created_at, b.id.as_str()));
        match self {
            Direction::Ascending => ord,
            Direction::Descending => ord.reverse(),
        }
    }

    /// True if `doc` comes strictly after `cursor` in this direction.
    pub fn is_after(self, doc: &Document, cursor: &Cursor) -> bool {
        let ord = (doc.created_at, doc.id.as_str()).cmp(&cursor.key());
        match self {
            Direction::Ascending => ord == Ordering::Greater,
            Direction::Descending => ord == Ordering::Less,
        }
    }
}

/// Equality predicate on a document field (e.g. `status = "active"`).
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// A `null` value also matches documents that lack the field.
    pub fn matches(&self, doc: &Document) -> bool {
        match doc.fields.get(&self.field) {
            Some(v) => v == &self.value,
            None => self.value.is_null(),
        }
    }
}

/// Ordered, bounded query against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Option<Filter>,
    pub direction: Direction,
    pub limit: Option<usize>,
    pub start_after: Option<Cursor>,
}

impl Query {
    /// All documents of `collection`, newest first.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filter: None,
            direction: Direction::Descending,
            limit: None,
            start_after: None,
        }
    }

    pub fn filter(mut self, filter: Option<Filter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn start_after(mut self, cursor: Option<Cursor>) -> Self {
        self.start_after = cursor;
        self
    }
}

/// Current time as Unix milliseconds.
pub fn now_millis() -> Millis {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as Millis
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, ts: Millis) -> Document {
        Document::from_json(id, ts, json!({ "status": "active" })).unwrap()
    }

    #[test]
    fn descending_order_breaks_ties_by_id() {
        let mut docs = vec![doc("a", 10), doc("c", 20), doc("b", 20)];
        docs.sort_by(|a, b| Direction::Descending.compare(a, b));
        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "a"]);
    }

    #[test]
    fn is_after_respects_direction_and_ties() {
        let cursor = doc("b", 20).cursor();
        assert!(Direction::Descending.is_after(&doc("a", 20), &cursor));
        assert!(Direction::Descending.is_after(&doc("z", 10), &cursor));
        assert!(!Direction::Descending.is_after(&doc("b", 20), &cursor));
        assert!(Direction::Ascending.is_after(&doc("c", 20), &cursor));
    }

    #[test]
    fn filter_matching() {
        let d = doc("a", 1);
        assert!(Filter::equals("status", "active").matches(&d));
        assert!(!Filter::equals("status", "banned").matches(&d));
        assert!(Filter::equals("missing", Value::Null).matches(&d));
    }

    #[test]
    fn decode_injects_id_and_timestamp() {
        #[derive(Deserialize)]
        struct Row {
            id: String,
            created_at: i64,
            status: String,
        }
        let row: Row = doc("u1", 42).decode().unwrap();
        assert_eq!(row.id, "u1");
        assert_eq!(row.created_at, 42);
        assert_eq!(row.status, "active");
    }

    #[test]
    fn non_object_body_is_rejected() {
        assert!(matches!(
            Document::from_json("x", 0, json!([1, 2])),
            Err(RemoteError::Decode(_))
        ));
    }
}
