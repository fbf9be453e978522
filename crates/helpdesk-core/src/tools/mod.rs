//! Built-in tools the model can call during an exchange.
//!
//! - `registry`: name -> handler dispatch and the advertised schemas
//! - `search`: `searchSite`, allowlisted page fetch + text extraction
//! - `faq`: `getFAQ`, static question/answer pairs
//! - `memory`: `saveMemory` / `recallMemory` against the exchange's [`ToolScope`]
//! - `fetch`: the `PageFetcher` port used by `searchSite`
//!
//! Handlers never fail the exchange. Every error is turned into a
//! `{ "success": false, ... }` outcome and handed back to the model.

pub mod faq;
pub mod fetch;
pub mod memory;
pub mod registry;
pub mod search;

use serde_json::Value;
use thiserror::Error;

use helpdesk_types::error::RepositoryError;
use helpdesk_types::memory::MemoryDelta;
use helpdesk_types::session::SessionId;
use helpdesk_types::tool::ToolOutcome;

use crate::repository::memory::MemoryStore;

/// Internal failure of a tool handler.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    DomainNotAllowed(String),

    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

impl ToolError {
    /// Machine-readable code placed next to the message in the outcome.
    pub fn code(&self) -> &'static str {
        match self {
            ToolError::InvalidArguments(_) => "invalid_arguments",
            ToolError::DomainNotAllowed(_) => "domain_not_allowed",
            ToolError::Fetch(_) => "fetch_failed",
            ToolError::Storage(_) => "storage_error",
        }
    }
}

impl From<ToolError> for ToolOutcome {
    fn from(err: ToolError) -> Self {
        ToolOutcome::failure_with_code(err.code(), err.to_string())
    }
}

/// Per-exchange state visible to tool handlers.
///
/// Memory writes are staged here rather than written through, and are
/// committed together with the exchange's history once the reply is final.
/// Reads see staged writes first so a `recallMemory` after a `saveMemory`
/// in the same exchange returns the new value.
pub struct ToolScope<'a, M: MemoryStore> {
    session_id: &'a SessionId,
    store: &'a M,
    staged: MemoryDelta,
}

impl<'a, M: MemoryStore> ToolScope<'a, M> {
    pub fn new(session_id: &'a SessionId, store: &'a M) -> Self {
        Self {
            session_id,
            store,
            staged: MemoryDelta::new(),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        self.session_id
    }

    /// Stage a write. A later write to the same key replaces the earlier one.
    pub fn stage(&mut self, key: String, value: String) {
        self.staged.insert(key, value);
    }

    /// Read a key, preferring this exchange's staged writes over the store.
    pub async fn read(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        if let Some(value) = self.staged.get(key) {
            return Ok(Some(value.clone()));
        }
        self.store.get(self.session_id, key).await
    }

    pub fn staged(&self) -> &MemoryDelta {
        &self.staged
    }

    /// Consume the scope, yielding the exchange's memory write-set.
    pub fn into_delta(self) -> MemoryDelta {
        self.staged
    }
}

/// Normalize raw call arguments to a JSON object.
///
/// Gateways hand over whatever the model produced; a JSON-encoded string is
/// decoded, `null` becomes an empty object, anything else is rejected.
pub(crate) fn arguments_object(
    arguments: &Value,
) -> Result<serde_json::Map<String, Value>, ToolError> {
    match arguments {
        Value::Object(map) => Ok(map.clone()),
        Value::Null => Ok(serde_json::Map::new()),
        Value::String(raw) if raw.trim().is_empty() => Ok(serde_json::Map::new()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Ok(map),
            _ => Err(ToolError::InvalidArguments(
                "arguments must be a JSON object".to_string(),
            )),
        },
        _ => Err(ToolError::InvalidArguments(
            "arguments must be a JSON object".to_string(),
        )),
    }
}

/// Required, non-empty string argument.
pub(crate) fn required_string(
    args: &serde_json::Map<String, Value>,
    name: &str,
) -> Result<String, ToolError> {
    match args.get(name) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.clone()),
        Some(Value::String(_)) => Err(ToolError::InvalidArguments(format!(
            "'{name}' must not be empty"
        ))),
        Some(_) => Err(ToolError::InvalidArguments(format!(
            "'{name}' must be a string"
        ))),
        None => Err(ToolError::InvalidArguments(format!(
            "missing required argument '{name}'"
        ))),
    }
}
