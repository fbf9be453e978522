//! MemoryStore trait definition.

use helpdesk_types::error::RepositoryError;
use helpdesk_types::memory::MemoryEntry;
use helpdesk_types::session::SessionId;

/// Per-session key/value memory with last-write-wins upserts.
pub trait MemoryStore: Send + Sync {
    /// Get the current value for `key`, or `None` if it was never written.
    fn get(
        &self,
        session_id: &SessionId,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Insert or overwrite `key`.
    fn set(
        &self,
        session_id: &SessionId,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// All entries for a session, ordered by key.
    fn list(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send;

    /// Delete every entry for the session.
    fn clear(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
