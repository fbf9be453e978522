//! BoxModelGateway -- object-safe dynamic dispatch wrapper for ModelGateway.
//!
//! 1. Define an object-safe `ModelGatewayDyn` trait with boxed futures
//! 2. Blanket-impl `ModelGatewayDyn` for all `T: ModelGateway`
//! 3. `BoxModelGateway` wraps `Box<dyn ModelGatewayDyn>` and delegates

use std::future::Future;
use std::pin::Pin;

use helpdesk_types::llm::{CompletionRequest, LlmError, ModelReply};

use super::gateway::ModelGateway;

/// Object-safe version of [`ModelGateway`] with boxed futures.
pub trait ModelGatewayDyn: Send + Sync {
    fn name(&self) -> &str;

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ModelReply, LlmError>> + Send + 'a>>;
}

impl<T: ModelGateway> ModelGatewayDyn for T {
    fn name(&self) -> &str {
        ModelGateway::name(self)
    }

    fn complete_boxed<'a>(
        &'a self,
        request: &'a CompletionRequest,
    ) -> Pin<Box<dyn Future<Output = Result<ModelReply, LlmError>> + Send + 'a>> {
        Box::pin(self.complete(request))
    }
}

/// Type-erased model gateway, chosen at startup from configuration.
pub struct BoxModelGateway {
    inner: Box<dyn ModelGatewayDyn + Send + Sync>,
}

impl BoxModelGateway {
    pub fn new<T: ModelGateway + 'static>(gateway: T) -> Self {
        Self {
            inner: Box::new(gateway),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub async fn complete(&self, request: &CompletionRequest) -> Result<ModelReply, LlmError> {
        self.inner.complete_boxed(request).await
    }
}
