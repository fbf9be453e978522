//! SQLite session store.
//!
//! Implements `HistoryStore`, `MemoryStore`, and `SessionStore` from
//! `helpdesk-core` using sqlx with split read/write pools. Multi-step
//! writes (exchange commit, reset) run in a single writer transaction.

use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use tracing::debug;

use helpdesk_core::repository::session::SessionStore;
use helpdesk_types::chat::Turn;
use helpdesk_types::error::RepositoryError;
use helpdesk_types::memory::MemoryDelta;
use helpdesk_types::session::SessionId;

use super::history;
use super::memory;
use super::pool::DatabasePool;

/// SQLite-backed session history and memory.
#[derive(Clone)]
pub struct SqliteSessionStore {
    pub(super) pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(super) fn query_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

pub(super) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

pub(super) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

async fn delete_session(
    conn: &mut SqliteConnection,
    session_id: &SessionId,
) -> Result<(), RepositoryError> {
    sqlx::query("DELETE FROM session_history WHERE session_id = ?")
        .bind(session_id.as_str())
        .execute(&mut *conn)
        .await
        .map_err(query_err)?;
    sqlx::query("DELETE FROM session_memory WHERE session_id = ?")
        .bind(session_id.as_str())
        .execute(&mut *conn)
        .await
        .map_err(query_err)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn commit_exchange(
        &self,
        session_id: &SessionId,
        turns: &[Turn],
        writes: &MemoryDelta,
    ) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        for (key, value) in writes {
            memory::upsert(&mut tx, session_id, key, value, &now).await?;
        }
        history::append_turns(&mut tx, session_id, turns, &now).await?;

        tx.commit().await.map_err(query_err)?;
        debug!(%session_id, turns = turns.len(), writes = writes.len(), "exchange committed to sqlite");
        Ok(())
    }

    async fn reset(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;
        delete_session(&mut tx, session_id).await?;
        tx.commit().await.map_err(query_err)?;
        Ok(())
    }
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use helpdesk_core::repository::history::HistoryStore;
    use helpdesk_core::repository::memory::MemoryStore;

    pub(crate) async fn test_store() -> SqliteSessionStore {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        SqliteSessionStore::new(pool)
    }

    fn sid(s: &str) -> SessionId {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_commit_exchange_writes_memory_and_history() {
        let store = test_store().await;
        let session = sid("S1");
        let writes = MemoryDelta::from([("name".to_string(), "John".to_string())]);

        store
            .commit_exchange(
                &session,
                &[Turn::user("My name is John"), Turn::assistant("Hi John")],
                &writes,
            )
            .await
            .unwrap();

        let turns = store.load(&session).await.unwrap();
        assert_eq!(turns, [Turn::user("My name is John"), Turn::assistant("Hi John")]);
        assert_eq!(store.get(&session, "name").await.unwrap().as_deref(), Some("John"));
    }

    #[tokio::test]
    async fn test_history_accumulates_across_commits() {
        let store = test_store().await;
        let session = sid("S1");

        for i in 0..3 {
            store
                .commit_exchange(
                    &session,
                    &[Turn::user(format!("q{i}")), Turn::assistant(format!("a{i}"))],
                    &MemoryDelta::new(),
                )
                .await
                .unwrap();
        }

        let turns = store.load(&session).await.unwrap();
        assert_eq!(turns.len(), 6);
        assert_eq!(turns[4], Turn::user("q2"));
        assert_eq!(turns[5], Turn::assistant("a2"));
    }

    #[tokio::test]
    async fn test_reset_clears_both_and_is_idempotent() {
        let store = test_store().await;
        let session = sid("S1");
        let other = sid("S2");
        let writes = MemoryDelta::from([("k".to_string(), "v".to_string())]);
        let turns = [Turn::user("u"), Turn::assistant("a")];
        store.commit_exchange(&session, &turns, &writes).await.unwrap();
        store.commit_exchange(&other, &turns, &writes).await.unwrap();

        store.reset(&session).await.unwrap();
        store.reset(&session).await.unwrap();

        assert!(store.load(&session).await.unwrap().is_empty());
        assert!(store.get(&session, "k").await.unwrap().is_none());
        assert_eq!(store.load(&other).await.unwrap().len(), 2);
        assert_eq!(store.get(&other, "k").await.unwrap().as_deref(), Some("v"));
    }
}
