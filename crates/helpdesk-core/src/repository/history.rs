//! HistoryStore trait definition.

use helpdesk_types::chat::Turn;
use helpdesk_types::error::RepositoryError;
use helpdesk_types::session::SessionId;

/// Ordered conversation history, one logical document per session.
///
/// Implementations live in helpdesk-infra (e.g., `SqliteSessionStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait HistoryStore: Send + Sync {
    /// Load the full history for a session. Unknown sessions yield an empty list.
    fn load(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// Append turns to the end of a session's history, creating it if absent.
    fn append(
        &self,
        session_id: &SessionId,
        turns: &[Turn],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Delete the session's history. Clearing an absent history is not an error.
    fn clear(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
