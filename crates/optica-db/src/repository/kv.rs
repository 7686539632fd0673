//! # Key-Value Repository
//!
//! The storage primitive every other repository builds on: JSON documents
//! addressed by `(namespace, key)`.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  kv_entries                                                             │
//! │  ┌────────────────────────┬──────────────┬────────────────┬──────────┐  │
//! │  │ namespace              │ key          │ value (JSON)   │updated_at│  │
//! │  ├────────────────────────┼──────────────┼────────────────┼──────────┤  │
//! │  │ sales:store-1          │ 3f2a…        │ {"id":…}       │ …        │  │
//! │  │ products:store-1       │ frame-1      │ {"id":…}       │ …        │  │
//! │  │ settings               │ tax_rate:s-1 │ "16"           │ …        │  │
//! │  │ settings               │ sale_seq:s-1 │ 42             │ …        │  │
//! │  └────────────────────────┴──────────────┴────────────────┴──────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The free functions take any executor so repositories can run several
//! writes inside one transaction.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Namespace names.
pub mod namespace {
    /// Store-independent settings.
    pub const SETTINGS: &str = "settings";

    pub fn sales(store_id: &str) -> String {
        format!("sales:{}", store_id)
    }

    pub fn products(store_id: &str) -> String {
        format!("products:{}", store_id)
    }

    pub fn contact_lenses(store_id: &str) -> String {
        format!("contact_lenses:{}", store_id)
    }
}

// =============================================================================
// Executor-level Operations
// =============================================================================

/// Reads one document.
pub(crate) async fn fetch<'e, E, T>(executor: E, namespace: &str, key: &str) -> DbResult<Option<T>>
where
    E: Executor<'e, Database = Sqlite>,
    T: DeserializeOwned,
{
    let raw: Option<String> =
        sqlx::query_scalar("SELECT value FROM kv_entries WHERE namespace = ?1 AND key = ?2")
            .bind(namespace.to_string())
            .bind(key.to_string())
            .fetch_optional(executor)
            .await?;

    raw.map(|r| decode(namespace, key, &r)).transpose()
}

/// Inserts or replaces a document.
pub(crate) async fn put<'e, E, T>(executor: E, namespace: &str, key: &str, value: &T) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;

    sqlx::query(
        r#"
        INSERT INTO kv_entries (namespace, key, value, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (namespace, key) DO UPDATE SET
            value = excluded.value,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(namespace.to_string())
    .bind(key.to_string())
    .bind(json)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(())
}

/// Inserts a document, failing with `UniqueViolation` if the key exists.
pub(crate) async fn insert<'e, E, T>(executor: E, namespace: &str, key: &str, value: &T) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;

    sqlx::query(
        r#"
        INSERT INTO kv_entries (namespace, key, value, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(namespace.to_string())
    .bind(key.to_string())
    .bind(json)
    .bind(Utc::now())
    .execute(executor)
    .await
    .map_err(|e| match DbError::from(e) {
        DbError::UniqueViolation { .. } => DbError::duplicate(namespace, key),
        other => other,
    })?;

    Ok(())
}

/// Overwrites an existing document. Returns `false` if the key is absent.
pub(crate) async fn replace<'e, E, T>(executor: E, namespace: &str, key: &str, value: &T) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
    T: Serialize + ?Sized,
{
    let json = serde_json::to_string(value)?;

    let result = sqlx::query(
        r#"
        UPDATE kv_entries SET value = ?3, updated_at = ?4
        WHERE namespace = ?1 AND key = ?2
        "#,
    )
    .bind(namespace.to_string())
    .bind(key.to_string())
    .bind(json)
    .bind(Utc::now())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Deletes a document. Returns `false` if the key is absent.
pub(crate) async fn remove<'e, E>(executor: E, namespace: &str, key: &str) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM kv_entries WHERE namespace = ?1 AND key = ?2")
        .bind(namespace.to_string())
        .bind(key.to_string())
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn decode<T: DeserializeOwned>(namespace: &str, key: &str, raw: &str) -> DbResult<T> {
    serde_json::from_str(raw)
        .map_err(|e| DbError::Serialization(format!("{}/{}: {}", namespace, key, e)))
}

// =============================================================================
// Repository
// =============================================================================

/// Pool-level key-value access.
#[derive(Debug, Clone)]
pub struct KvRepository {
    pool: SqlitePool,
}

impl KvRepository {
    pub fn new(pool: SqlitePool) -> Self {
        KvRepository { pool }
    }

    /// Reads one document.
    pub async fn get<T: DeserializeOwned>(&self, namespace: &str, key: &str) -> DbResult<Option<T>> {
        fetch(&self.pool, namespace, key).await
    }

    /// Writes one document, replacing any previous value.
    pub async fn set<T: Serialize + ?Sized>(&self, namespace: &str, key: &str, value: &T) -> DbResult<()> {
        debug!(namespace = %namespace, key = %key, "Writing kv entry");
        put(&self.pool, namespace, key, value).await
    }

    /// Every document in a namespace, in insertion order.
    pub async fn list<T: DeserializeOwned>(&self, namespace: &str) -> DbResult<Vec<T>> {
        Ok(self
            .entries(namespace)
            .await?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    /// Every `(key, document)` pair in a namespace, in insertion order.
    pub async fn entries<T: DeserializeOwned>(&self, namespace: &str) -> DbResult<Vec<(String, T)>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT key, value FROM kv_entries WHERE namespace = ?1 ORDER BY rowid",
        )
        .bind(namespace)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(key, raw)| {
                let value = decode(namespace, &key, &raw)?;
                Ok((key, value))
            })
            .collect()
    }

    /// Deletes one document. Returns `false` if it did not exist.
    pub async fn delete(&self, namespace: &str, key: &str) -> DbResult<bool> {
        debug!(namespace = %namespace, key = %key, "Deleting kv entry");
        remove(&self.pool, namespace, key).await
    }

    /// Number of documents in a namespace.
    pub async fn count(&self, namespace: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv_entries WHERE namespace = ?1")
            .bind(namespace)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    fn note(text: &str) -> Note {
        Note {
            text: text.to_string(),
        }
    }

    async fn kv() -> KvRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().kv()
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let kv = kv().await;

        assert_eq!(kv.get::<Note>("notes", "a").await.unwrap(), None);

        kv.set("notes", "a", &note("first")).await.unwrap();
        kv.set("notes", "a", &note("second")).await.unwrap();

        assert_eq!(kv.get::<Note>("notes", "a").await.unwrap(), Some(note("second")));
        assert_eq!(kv.count("notes").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order_and_namespaces() {
        let kv = kv().await;
        kv.set("notes", "z", &note("1")).await.unwrap();
        kv.set("notes", "a", &note("2")).await.unwrap();
        kv.set("other", "m", &note("x")).await.unwrap();
        // Overwrite keeps the original position
        kv.set("notes", "z", &note("1b")).await.unwrap();

        let listed: Vec<Note> = kv.list("notes").await.unwrap();
        assert_eq!(listed, vec![note("1b"), note("2")]);

        let keys: Vec<String> = kv
            .entries::<Note>("notes")
            .await
            .unwrap()
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(keys, vec!["z".to_string(), "a".to_string()]);
    }

    #[tokio::test]
    async fn test_delete() {
        let kv = kv().await;
        kv.set("notes", "a", &note("x")).await.unwrap();

        assert!(kv.delete("notes", "a").await.unwrap());
        assert!(!kv.delete("notes", "a").await.unwrap());
        assert_eq!(kv.count("notes").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicates() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        insert(db.pool(), "notes", "a", &note("x")).await.unwrap();

        let err = insert(db.pool(), "notes", "a", &note("y")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_reported() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.kv().set("notes", "a", &serde_json::json!({"wrong": 1})).await.unwrap();

        let err = db.kv().get::<Note>("notes", "a").await.unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(namespace::sales("s1"), "sales:s1");
        assert_eq!(namespace::contact_lenses("s1"), "contact_lenses:s1");
    }
}
