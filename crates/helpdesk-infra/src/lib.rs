//! Infrastructure layer for the helpdesk agent.
//!
//! Contains implementations of the ports defined in `helpdesk-core`:
//! SQLite session storage, the OpenAI-compatible model gateway, and the
//! allowlist-enforcing page fetcher. Also loads configuration.

pub mod config;
pub mod llm;
pub mod sqlite;
pub mod web;
