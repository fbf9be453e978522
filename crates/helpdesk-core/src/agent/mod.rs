//! The tool-use loop for one exchange.
//!
//! - `SystemPromptBuilder`: the fixed helpdesk system prompt
//! - `AgentContext`: the working context (system prompt, history, new message, tool traffic)
//! - `AgentEngine`: drives model calls and tool invocations until a final reply

pub mod context;
pub mod engine;
pub mod prompt;
