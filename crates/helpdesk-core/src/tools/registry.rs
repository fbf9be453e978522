//! Tool registry: the fixed set of tools, their schemas, and dispatch.

use tracing::{debug, warn};

use helpdesk_types::llm::{ToolCall, ToolSchema};
use helpdesk_types::tool::{ToolName, ToolOutcome};

use super::search::SearchSiteTool;
use super::{ToolScope, faq, memory};
use crate::repository::memory::MemoryStore;

/// Dispatches tool calls by name.
///
/// Stateless with respect to sessions: per-exchange state lives in the
/// [`ToolScope`] passed to [`ToolRegistry::invoke`], so one registry is
/// shared by every session.
pub struct ToolRegistry {
    search: SearchSiteTool,
}

impl ToolRegistry {
    pub fn new(search: SearchSiteTool) -> Self {
        Self { search }
    }

    /// Schemas advertised to the model, in a stable order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        ToolName::ALL.into_iter().map(schema_for).collect()
    }

    /// Run one tool call. Never fails: unknown tools and handler errors
    /// come back as `success: false` outcomes.
    pub async fn invoke<M: MemoryStore>(
        &self,
        call: &ToolCall,
        scope: &mut ToolScope<'_, M>,
    ) -> ToolOutcome {
        let Ok(name) = call.name.parse::<ToolName>() else {
            warn!(tool = %call.name, "model requested an unsupported tool");
            return ToolOutcome::failure_with_code(
                "unsupported_tool",
                format!("unsupported tool: '{}'", call.name),
            );
        };

        let outcome = match name {
            ToolName::SearchSite => self.search.invoke(&call.arguments).await,
            ToolName::GetFaq => faq::invoke(),
            ToolName::SaveMemory => memory::save(scope, &call.arguments),
            ToolName::RecallMemory => memory::recall(scope, &call.arguments).await,
        };
        debug!(tool = %name, success = outcome.success, "tool invoked");
        outcome
    }
}

fn schema_for(name: ToolName) -> ToolSchema {
    let (description, parameters) = match name {
        ToolName::SearchSite => (
            "Fetch a web page from an allowed documentation site and return its text content.",
            SearchSiteTool::parameters(),
        ),
        ToolName::GetFaq => (
            "Return the helpdesk's frequently asked questions with their answers.",
            faq::parameters(),
        ),
        ToolName::SaveMemory => (
            "Remember a fact about the user for the rest of this session.",
            memory::save_parameters(),
        ),
        ToolName::RecallMemory => (
            "Look up a fact previously saved with saveMemory.",
            memory::recall_parameters(),
        ),
    };
    ToolSchema {
        name: name.as_str().to_string(),
        description: description.to_string(),
        parameters,
    }
}
