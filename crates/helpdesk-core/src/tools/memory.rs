//! `saveMemory` and `recallMemory`.

use serde_json::{Value, json};
use tracing::debug;

use helpdesk_types::tool::ToolOutcome;

use super::{ToolError, ToolScope, arguments_object, required_string};
use crate::repository::memory::MemoryStore;

pub fn save_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "key": {"type": "string", "description": "Short name for the fact, e.g. \"name\""},
            "value": {"type": "string", "description": "The fact to remember"}
        },
        "required": ["key", "value"]
    })
}

pub fn recall_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "key": {"type": "string", "description": "Name the fact was saved under"}
        },
        "required": ["key"]
    })
}

/// Stage a memory write in the exchange scope.
pub fn save<M: MemoryStore>(scope: &mut ToolScope<'_, M>, arguments: &Value) -> ToolOutcome {
    let parsed = arguments_object(arguments).and_then(|args| {
        let key = required_string(&args, "key")?;
        let value = required_string(&args, "value")?;
        Ok((key, value))
    });
    match parsed {
        Ok((key, value)) => {
            debug!(session_id = %scope.session_id(), %key, "memory write staged");
            let outcome = ToolOutcome::ok(json!({"key": key, "value": value}));
            scope.stage(key, value);
            outcome
        }
        Err(err) => err.into(),
    }
}

/// Read a memory value, distinguishing a missing key from a storage failure.
pub async fn recall<M: MemoryStore>(scope: &ToolScope<'_, M>, arguments: &Value) -> ToolOutcome {
    let key = match arguments_object(arguments).and_then(|args| required_string(&args, "key")) {
        Ok(key) => key,
        Err(err) => return err.into(),
    };
    match scope.read(&key).await {
        Ok(Some(value)) => ToolOutcome::ok(json!({"key": key, "value": value})),
        Ok(None) => ToolOutcome::failure_with_code(
            "not_found",
            format!("no memory saved under key '{key}'"),
        ),
        Err(err) => ToolError::from(err).into(),
    }
}
