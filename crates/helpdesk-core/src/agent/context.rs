//! Working context for one exchange.

use helpdesk_types::chat::Turn;
use helpdesk_types::llm::{CompletionRequest, Message, MessageRole, ToolSchema};

/// The message list sent to the model, grown as tools are called.
///
/// Built once per exchange as system prompt, then stored history in order,
/// then the new user message. Tool requests and their results are appended
/// during the loop and are never persisted.
#[derive(Debug, Clone)]
pub struct AgentContext {
    messages: Vec<Message>,
}

impl AgentContext {
    pub fn new(system_prompt: &str, history: &[Turn], user_message: &str) -> Self {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::text(MessageRole::System, system_prompt));
        messages.extend(history.iter().map(Turn::to_message));
        messages.push(Message::text(MessageRole::User, user_message));
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn to_request(&self, model: &str, tools: Vec<ToolSchema>, max_tokens: u32) -> CompletionRequest {
        CompletionRequest {
            model: model.to_string(),
            messages: self.messages.clone(),
            tools,
            max_tokens,
        }
    }
}
