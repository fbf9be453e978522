//! Shared domain types for the helpdesk agent.
//!
//! Sessions, turns, memory entries, model/tool wire shapes, the exchange
//! payload contract, configuration, and the error enums used across crates.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod exchange;
pub mod llm;
pub mod memory;
pub mod session;
pub mod tool;
