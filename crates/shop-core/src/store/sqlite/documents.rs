//! Document operations: get, put, delete, ordered query, count.

use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};

use super::SqliteStore;
use crate::retry::RemoteError;
use crate::store::{Direction, Document, DocumentStore, Filter, Query};

fn row_to_document(row: &SqliteRow) -> Result<Document, RemoteError> {
    let id: String = row.get("id");
    let created_at: i64 = row.get("created_at");
    let body: String = row.get("body");
    let fields: Map<String, Value> = serde_json::from_str(&body)?;
    Ok(Document::new(id, created_at, fields))
}

/// Append ` AND <field predicate>` for an equality filter on a JSON field.
fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &Filter) -> Result<(), RemoteError> {
    let path = format!("$.\"{}\"", filter.field.replace('"', "\\\""));
    qb.push(" AND json_extract(body, ").push_bind(path).push(")");
    match &filter.value {
        Value::Null => {
            qb.push(" IS NULL");
        }
        // json_extract yields 1/0 for JSON booleans.
        Value::Bool(b) => {
            qb.push(" = ").push_bind(i64::from(*b));
        }
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                qb.push(" = ").push_bind(i);
            } else if let Some(f) = n.as_f64() {
                qb.push(" = ").push_bind(f);
            } else {
                return Err(RemoteError::Other(format!(
                    "unsupported numeric filter on {}",
                    filter.field
                )));
            }
        }
        Value::String(s) => {
            qb.push(" = ").push_bind(s.clone());
        }
        Value::Array(_) | Value::Object(_) => {
            return Err(RemoteError::Other(format!(
                "filter on {} must compare against a scalar",
                filter.field
            )));
        }
    }
    Ok(())
}

impl DocumentStore for SqliteStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, RemoteError> {
        let row = sqlx::query(
            r#"
            SELECT id, created_at, body
            FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn put(&self, collection: &str, doc: &Document) -> Result<(), RemoteError> {
        let body = serde_json::to_string(&doc.fields)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, created_at, body)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (collection, id) DO UPDATE
            SET created_at = excluded.created_at,
                body = excluded.body
            "#,
        )
        .bind(collection)
        .bind(&doc.id)
        .bind(doc.created_at)
        .bind(body)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool, RemoteError> {
        let r = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = ?1 AND id = ?2
            "#,
        )
        .bind(collection)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(r.rows_affected() > 0)
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, RemoteError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, created_at, body FROM documents WHERE collection = ");
        qb.push_bind(query.collection.clone());

        if let Some(filter) = &query.filter {
            push_filter(&mut qb, filter)?;
        }

        let (cmp, order) = match query.direction {
            Direction::Descending => ("<", " ORDER BY created_at DESC, id DESC"),
            Direction::Ascending => (">", " ORDER BY created_at ASC, id ASC"),
        };
        if let Some(cursor) = &query.start_after {
            qb.push(" AND (created_at ")
                .push(cmp)
                .push(" ")
                .push_bind(cursor.created_at())
                .push(" OR (created_at = ")
                .push_bind(cursor.created_at())
                .push(" AND id ")
                .push(cmp)
                .push(" ")
                .push_bind(cursor.id().to_string())
                .push("))");
        }
        qb.push(order);
        if let Some(limit) = query.limit {
            qb.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = qb.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }

    async fn count(&self, collection: &str, filter: Option<&Filter>) -> Result<u64, RemoteError> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) AS n FROM documents WHERE collection = ");
        qb.push_bind(collection.to_string());
        if let Some(filter) = filter {
            push_filter(&mut qb, filter)?;
        }

        let row = qb.build().fetch_one(&self.pool).await?;
        let n: i64 = row.get("n");
        Ok(n.max(0) as u64)
    }
}
