//! Storage traits for per-session state.
//!
//! `HistoryStore` and `MemoryStore` are the two point stores a session owns;
//! `SessionStore` combines them with the multi-step operations the session
//! controller needs to be atomic.

pub mod history;
pub mod memory;
pub mod session;
