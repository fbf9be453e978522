//! `MemoryStore` for `SqliteSessionStore`.

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use helpdesk_core::repository::memory::MemoryStore;
use helpdesk_types::error::RepositoryError;
use helpdesk_types::memory::MemoryEntry;
use helpdesk_types::session::SessionId;

use super::session::{SqliteSessionStore, format_datetime, parse_datetime, query_err};

/// Last-write-wins upsert on an open connection.
pub(super) async fn upsert(
    conn: &mut SqliteConnection,
    session_id: &SessionId,
    key: &str,
    value: &str,
    now: &str,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"INSERT INTO session_memory (session_id, key, value, updated_at)
           VALUES (?, ?, ?, ?)
           ON CONFLICT (session_id, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
    )
    .bind(session_id.as_str())
    .bind(key)
    .bind(value)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(query_err)?;
    Ok(())
}

impl MemoryStore for SqliteSessionStore {
    async fn get(&self, session_id: &SessionId, key: &str) -> Result<Option<String>, RepositoryError> {
        let row = sqlx::query("SELECT value FROM session_memory WHERE session_id = ? AND key = ?")
            .bind(session_id.as_str())
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let value: String = row.try_get("value").map_err(query_err)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(&self, session_id: &SessionId, key: &str, value: &str) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let mut conn = self.pool.writer.acquire().await.map_err(query_err)?;
        upsert(&mut conn, session_id, key, value, &now).await
    }

    async fn list(&self, session_id: &SessionId) -> Result<Vec<MemoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT key, value, updated_at FROM session_memory WHERE session_id = ? ORDER BY key",
        )
        .bind(session_id.as_str())
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let updated_at: String = row.try_get("updated_at").map_err(query_err)?;
            entries.push(MemoryEntry {
                session_id: session_id.clone(),
                key: row.try_get("key").map_err(query_err)?,
                value: row.try_get("value").map_err(query_err)?,
                updated_at: parse_datetime(&updated_at)?,
            });
        }
        Ok(entries)
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM session_memory WHERE session_id = ?")
            .bind(session_id.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::session::tests::test_store;

    #[tokio::test]
    async fn test_set_overwrites_value() {
        let store = test_store().await;
        let session: SessionId = "S1".parse().unwrap();

        store.set(&session, "name", "John").await.unwrap();
        store.set(&session, "name", "Jane").await.unwrap();

        assert_eq!(store.get(&session, "name").await.unwrap().as_deref(), Some("Jane"));
        assert_eq!(store.list(&session).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let store = test_store().await;
        let session: SessionId = "S1".parse().unwrap();
        assert!(store.get(&session, "nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_keys_are_scoped_per_session() {
        let store = test_store().await;
        let a: SessionId = "A".parse().unwrap();
        let b: SessionId = "B".parse().unwrap();

        store.set(&a, "color", "blue").await.unwrap();
        assert!(store.get(&b, "color").await.unwrap().is_none());

        MemoryStore::clear(&store, &b).await.unwrap();
        assert_eq!(store.get(&a, "color").await.unwrap().as_deref(), Some("blue"));
    }

    #[tokio::test]
    async fn test_list_orders_by_key() {
        let store = test_store().await;
        let session: SessionId = "S1".parse().unwrap();
        store.set(&session, "zeta", "1").await.unwrap();
        store.set(&session, "alpha", "2").await.unwrap();

        let keys: Vec<String> = store
            .list(&session)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect();
        assert_eq!(keys, ["alpha", "zeta"]);
    }
}
