//! ModelGateway trait definition.

use helpdesk_types::llm::{CompletionRequest, LlmError, ModelReply};

/// A language model that answers a working context with either a final
/// reply or a batch of tool-call requests.
///
/// Gateways are stateless with respect to session data: everything they
/// need arrives in the request. The controller never retries a failed call.
pub trait ModelGateway: Send + Sync {
    /// Human-readable backend name (e.g., "openai-compat"), used in spans.
    fn name(&self) -> &str;

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<ModelReply, LlmError>> + Send;
}
