//! SessionStore: the combined store the session controller drives.

use helpdesk_types::chat::Turn;
use helpdesk_types::error::RepositoryError;
use helpdesk_types::memory::MemoryDelta;
use helpdesk_types::session::SessionId;

use super::history::HistoryStore;
use super::memory::MemoryStore;

/// History plus memory for a session, with the two operations that touch
/// both.
///
/// The provided defaults run the steps one after another. Backends that
/// can do better (SQLite) override them with a single transaction so a
/// crash never leaves memory written without its history, or the reverse.
pub trait SessionStore: HistoryStore + MemoryStore {
    /// Persist the outcome of one exchange: memory writes first, then the
    /// appended turns.
    fn commit_exchange(
        &self,
        session_id: &SessionId,
        turns: &[Turn],
        writes: &MemoryDelta,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        async move {
            for (key, value) in writes {
                MemoryStore::set(self, session_id, key, value).await?;
            }
            HistoryStore::append(self, session_id, turns).await
        }
    }

    /// Erase all state for the session. Idempotent.
    fn reset(
        &self,
        session_id: &SessionId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        async move {
            HistoryStore::clear(self, session_id).await?;
            MemoryStore::clear(self, session_id).await
        }
    }
}
