//! Tool-use loop execution.
//!
//! AgentEngine sends the working context to the model gateway, runs any
//! requested tools, feeds their results back, and repeats until the model
//! produces a final reply or the iteration bound is reached.

use tracing::{Instrument, debug, info, info_span, warn};

use helpdesk_types::llm::{LlmError, Message, ModelReply};
use helpdesk_types::memory::MemoryDelta;
use helpdesk_types::session::SessionId;
use helpdesk_types::tool::ToolName;

use crate::llm::box_gateway::BoxModelGateway;
use crate::repository::memory::MemoryStore;
use crate::tools::ToolScope;
use crate::tools::registry::ToolRegistry;

use super::context::AgentContext;

/// Reply used when the model keeps asking for tools past the bound.
pub const TOOL_LIMIT_REPLY: &str = "I wasn't able to finish using my tools for this request. \
     Please try rephrasing your question.";

/// Reply used when the model answers with nothing.
pub const EMPTY_REPLY: &str = "Sorry, no response.";

/// Loop limits.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Model calls allowed per exchange.
    pub max_tool_iterations: u32,
    pub max_tokens: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_tool_iterations: 5,
            max_tokens: 512,
        }
    }
}

/// What one run of the loop produced. Nothing here has been persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopOutcome {
    pub reply: String,
    /// Distinct known tool names, in first-use order.
    pub tools_used: Vec<String>,
    /// Staged `saveMemory` writes.
    pub memory_delta: MemoryDelta,
}

/// Drives the model/tool loop. Shared across all sessions.
pub struct AgentEngine {
    gateway: BoxModelGateway,
    tools: ToolRegistry,
    system_prompt: String,
    settings: EngineSettings,
}

impl AgentEngine {
    pub fn new(
        gateway: BoxModelGateway,
        tools: ToolRegistry,
        system_prompt: String,
        settings: EngineSettings,
    ) -> Self {
        Self {
            gateway,
            tools,
            system_prompt,
            settings,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// Run the loop for one exchange.
    ///
    /// Gateway errors abort the run. Tool errors never do; they are fed
    /// back to the model as failed outcomes.
    pub async fn run<M: MemoryStore>(
        &self,
        session_id: &SessionId,
        mut context: AgentContext,
        model: &str,
        store: &M,
    ) -> Result<LoopOutcome, LlmError> {
        let mut scope = ToolScope::new(session_id, store);
        let mut tools_used: Vec<String> = Vec::new();
        let schemas = self.tools.schemas();

        for iteration in 1..=self.settings.max_tool_iterations {
            let request = context.to_request(model, schemas.clone(), self.settings.max_tokens);
            let span = info_span!(
                "gen_ai.complete",
                gen_ai.system = self.gateway.name(),
                gen_ai.request.model = %request.model,
                gen_ai.request.max_tokens = request.max_tokens,
                iteration,
            );
            let reply = self.gateway.complete(&request).instrument(span).await?;

            let calls = match reply {
                ModelReply::ToolRequest(calls) if !calls.is_empty() => calls,
                ModelReply::ToolRequest(_) => {
                    debug!(%session_id, iteration, "model sent an empty tool request");
                    return Ok(Self::finish(String::new(), tools_used, scope));
                }
                ModelReply::Final(text) => {
                    debug!(%session_id, iteration, "model produced final reply");
                    return Ok(Self::finish(text, tools_used, scope));
                }
            };

            context.push(Message::tool_request(calls.clone()));
            for call in &calls {
                let outcome = self.tools.invoke(call, &mut scope).await;
                if let Ok(name) = call.name.parse::<ToolName>() {
                    if !tools_used.iter().any(|used| used == name.as_str()) {
                        tools_used.push(name.as_str().to_string());
                    }
                }
                info!(
                    %session_id,
                    tool = %call.name,
                    iteration,
                    success = outcome.success,
                    "tool call completed"
                );
                context.push(Message::tool_result(
                    call.id.clone(),
                    outcome.to_context_string(),
                ));
            }
        }

        warn!(
            %session_id,
            max_tool_iterations = self.settings.max_tool_iterations,
            "tool loop bound reached, using fallback reply"
        );
        Ok(LoopOutcome {
            reply: TOOL_LIMIT_REPLY.to_string(),
            tools_used,
            memory_delta: scope.into_delta(),
        })
    }

    fn finish<M: MemoryStore>(
        text: String,
        tools_used: Vec<String>,
        scope: ToolScope<'_, M>,
    ) -> LoopOutcome {
        let reply = if text.trim().is_empty() {
            EMPTY_REPLY.to_string()
        } else {
            text
        };
        LoopOutcome {
            reply,
            tools_used,
            memory_delta: scope.into_delta(),
        }
    }
}
