//! Tool names and tool results.
//!
//! The model names tools with free-form strings at runtime; [`ToolName`] is
//! the closed set the registry knows how to dispatch. Anything else parses
//! to an error and is answered with an "unsupported tool" outcome.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The built-in tools. Wire names are camelCase to match what the model
/// is told in the tool schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolName {
    #[serde(rename = "searchSite")]
    SearchSite,
    #[serde(rename = "getFAQ")]
    GetFaq,
    #[serde(rename = "saveMemory")]
    SaveMemory,
    #[serde(rename = "recallMemory")]
    RecallMemory,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::SearchSite,
        ToolName::GetFaq,
        ToolName::SaveMemory,
        ToolName::RecallMemory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SearchSite => "searchSite",
            ToolName::GetFaq => "getFAQ",
            ToolName::SaveMemory => "saveMemory",
            ToolName::RecallMemory => "recallMemory",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolName::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| format!("unsupported tool: '{s}'"))
    }
}

/// Structured result of one tool invocation: `{ "success": bool, ...payload }`.
///
/// Handlers never raise; every failure is expressed as `success: false`
/// with an `error` message, and is fed back to the model as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl ToolOutcome {
    /// Successful outcome. Object payloads are flattened into the result;
    /// any other value is placed under `result`.
    pub fn ok(payload: Value) -> Self {
        let payload = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("result".to_string(), other);
                map
            }
        };
        Self {
            success: true,
            payload,
        }
    }

    /// Failed outcome carrying a human-readable error.
    pub fn failure(error: impl Into<String>) -> Self {
        let mut payload = Map::new();
        payload.insert("error".to_string(), Value::String(error.into()));
        Self {
            success: false,
            payload,
        }
    }

    /// Failed outcome with a machine-readable `code` next to the message.
    pub fn failure_with_code(code: &str, error: impl Into<String>) -> Self {
        let mut outcome = Self::failure(error);
        outcome
            .payload
            .insert("code".to_string(), Value::String(code.to_string()));
        outcome
    }

    pub fn error(&self) -> Option<&str> {
        self.payload.get("error").and_then(Value::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.payload.get("code").and_then(Value::as_str)
    }

    /// Serialized form fed back into the working context.
    pub fn to_context_string(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            r#"{"success":false,"error":"failed to serialize tool result"}"#.to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_name_roundtrip() {
        for name in ToolName::ALL {
            let parsed: ToolName = name.to_string().parse().unwrap();
            assert_eq!(name, parsed);
        }
    }

    #[test]
    fn test_tool_name_is_case_sensitive() {
        assert!("getFAQ".parse::<ToolName>().is_ok());
        assert!("getfaq".parse::<ToolName>().is_err());
        assert!("deleteEverything".parse::<ToolName>().is_err());
    }

    #[test]
    fn test_ok_outcome_flattens_object() {
        let outcome = ToolOutcome::ok(serde_json::json!({"key": "name", "value": "John"}));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": true, "key": "name", "value": "John"})
        );
    }

    #[test]
    fn test_ok_outcome_wraps_scalar() {
        let outcome = ToolOutcome::ok(serde_json::json!("text"));
        assert_eq!(outcome.payload.get("result"), Some(&serde_json::json!("text")));
    }

    #[test]
    fn test_failure_with_code() {
        let outcome = ToolOutcome::failure_with_code("not_found", "no such key");
        assert!(!outcome.success);
        assert_eq!(outcome.error(), Some("no such key"));
        assert_eq!(outcome.code(), Some("not_found"));
        let back: ToolOutcome = serde_json::from_str(&outcome.to_context_string()).unwrap();
        assert_eq!(back, outcome);
    }
}
