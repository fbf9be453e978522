//! Client-facing exchange payloads.
//!
//! These shapes are the contract with whatever transport sits in front of
//! the controller. Field presence matters: `tools_used` and `memory_delta`
//! are omitted entirely when empty, never sent as `[]` or `{}`.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::memory::MemoryDelta;

/// Result of a buffered exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeResult {
    pub reply: String,
    /// Distinct tool names invoked, in first-use order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools_used: Vec<String>,
    /// Memory writes made during this exchange only.
    #[serde(default, skip_serializing_if = "MemoryDelta::is_empty")]
    pub memory_delta: MemoryDelta,
}

/// One frame of a streamed exchange.
///
/// A well-formed stream is zero or more `Token`s followed by exactly one
/// `Done`, or a single `Error` in place of `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeEvent {
    Token(String),
    Done {
        tools_used: Vec<String>,
        memory_delta: MemoryDelta,
    },
    Error(String),
}

impl ExchangeEvent {
    /// JSON object carried by this frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"failed to serialize event"}"#.to_string())
    }
}

impl Serialize for ExchangeEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ExchangeEvent::Token(token) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("token", token)?;
                map.end()
            }
            ExchangeEvent::Done {
                tools_used,
                memory_delta,
            } => {
                let len = 1
                    + usize::from(!tools_used.is_empty())
                    + usize::from(!memory_delta.is_empty());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("done", &true)?;
                if !tools_used.is_empty() {
                    map.serialize_entry("tools_used", tools_used)?;
                }
                if !memory_delta.is_empty() {
                    map.serialize_entry("memory_delta", memory_delta)?;
                }
                map.end()
            }
            ExchangeEvent::Error(error) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("error", error)?;
                map.end()
            }
        }
    }
}
