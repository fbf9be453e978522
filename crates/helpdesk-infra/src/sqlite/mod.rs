//! SQLite persistence for session history and memory.

pub mod history;
pub mod memory;
pub mod pool;
pub mod session;
