//! OpenAI chat completions wire types.
//!
//! These are endpoint-specific request/response structures. They are NOT
//! the gateway types from helpdesk-types -- those are provider-agnostic.
//! Conversions between the two live here.

use serde::{Deserialize, Serialize};

use helpdesk_types::llm::{CompletionRequest, LlmError, Message, ModelReply, ToolCall, ToolSchema};

/// Request body for `POST {base_url}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ChatTool>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: String,
    /// `null` on assistant messages that only carry tool calls.
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTool {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ChatFunction,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// A tool call as it appears on the wire, in both directions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_kind")]
    pub kind: String,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    /// JSON-encoded arguments string.
    #[serde(default)]
    pub arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

/// Non-streaming response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

fn to_wire_message(message: &Message) -> ChatMessage {
    let tool_calls: Vec<WireToolCall> = message
        .tool_calls
        .iter()
        .map(|call| WireToolCall {
            id: call.id.clone(),
            kind: function_kind(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: match &call.arguments {
                    serde_json::Value::String(raw) => raw.clone(),
                    other => other.to_string(),
                },
            },
        })
        .collect();

    let content = if tool_calls.is_empty() || !message.content.is_empty() {
        Some(message.content.clone())
    } else {
        None
    };

    ChatMessage {
        role: message.role.to_string(),
        content,
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn to_wire_tool(schema: &ToolSchema) -> ChatTool {
    ChatTool {
        kind: function_kind(),
        function: ChatFunction {
            name: schema.name.clone(),
            description: schema.description.clone(),
            parameters: schema.parameters.clone(),
        },
    }
}

/// Build the wire request, substituting `default_model` when none is set.
pub fn to_chat_request(request: &CompletionRequest, default_model: &str) -> ChatRequest {
    let model = if request.model.trim().is_empty() {
        default_model.to_string()
    } else {
        request.model.clone()
    };
    ChatRequest {
        model,
        messages: request.messages.iter().map(to_wire_message).collect(),
        tools: request.tools.iter().map(to_wire_tool).collect(),
        max_tokens: request.max_tokens,
    }
}

/// Interpret the first choice as a final reply or a tool request.
///
/// Argument strings that are not valid JSON are passed through as a JSON
/// string so the tool sees (and can reject) exactly what the model sent.
pub fn to_model_reply(response: ChatResponse) -> Result<ModelReply, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::Deserialization("response contained no choices".to_string()))?;

    let calls = choice.message.tool_calls.unwrap_or_default();
    if calls.is_empty() {
        return Ok(ModelReply::Final(choice.message.content.unwrap_or_default()));
    }

    let calls = calls
        .into_iter()
        .map(|call| {
            let arguments = serde_json::from_str(&call.function.arguments)
                .unwrap_or(serde_json::Value::String(call.function.arguments));
            ToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            }
        })
        .collect();
    Ok(ModelReply::ToolRequest(calls))
}
