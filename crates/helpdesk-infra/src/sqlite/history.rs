//! `HistoryStore` for `SqliteSessionStore`.
//!
//! Each session's history is one row holding the whole turn list as a JSON
//! array. Appends are read-modify-write inside a writer transaction.

use chrono::Utc;
use sqlx::{Row, SqliteConnection};

use helpdesk_core::repository::history::HistoryStore;
use helpdesk_types::chat::Turn;
use helpdesk_types::error::RepositoryError;
use helpdesk_types::session::SessionId;

use super::session::{SqliteSessionStore, format_datetime, query_err};

fn decode_turns(raw: &str) -> Result<Vec<Turn>, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|e| RepositoryError::Query(format!("invalid history document: {e}")))
}

/// Append `turns` to the session's document on an open connection.
pub(super) async fn append_turns(
    conn: &mut SqliteConnection,
    session_id: &SessionId,
    turns: &[Turn],
    now: &str,
) -> Result<(), RepositoryError> {
    let row = sqlx::query("SELECT turns FROM session_history WHERE session_id = ?")
        .bind(session_id.as_str())
        .fetch_optional(&mut *conn)
        .await
        .map_err(query_err)?;

    let mut history = match row {
        Some(row) => {
            let raw: String = row.try_get("turns").map_err(query_err)?;
            decode_turns(&raw)?
        }
        None => Vec::new(),
    };
    history.extend_from_slice(turns);

    let document = serde_json::to_string(&history)
        .map_err(|e| RepositoryError::Query(format!("failed to serialize history: {e}")))?;

    sqlx::query(
        r#"INSERT INTO session_history (session_id, turns, updated_at)
           VALUES (?, ?, ?)
           ON CONFLICT (session_id) DO UPDATE SET turns = excluded.turns, updated_at = excluded.updated_at"#,
    )
    .bind(session_id.as_str())
    .bind(&document)
    .bind(now)
    .execute(&mut *conn)
    .await
    .map_err(query_err)?;

    Ok(())
}

impl HistoryStore for SqliteSessionStore {
    async fn load(&self, session_id: &SessionId) -> Result<Vec<Turn>, RepositoryError> {
        let row = sqlx::query("SELECT turns FROM session_history WHERE session_id = ?")
            .bind(session_id.as_str())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("turns").map_err(query_err)?;
                decode_turns(&raw)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn append(&self, session_id: &SessionId, turns: &[Turn]) -> Result<(), RepositoryError> {
        let now = format_datetime(&Utc::now());
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;
        append_turns(&mut tx, session_id, turns, &now).await?;
        tx.commit().await.map_err(query_err)?;
        Ok(())
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM session_history WHERE session_id = ?")
            .bind(session_id.as_str())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;
        Ok(())
    }
}
