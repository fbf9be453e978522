//! OpenAiCompatGateway -- [`ModelGateway`] for any endpoint that speaks the
//! OpenAI chat completions protocol (OpenAI, Workers AI, Ollama, vLLM, ...).
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is only exposed
//! while building the `Authorization` header. Local servers that need no key
//! are supported by passing `None`.

pub mod types;

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use secrecy::{ExposeSecret, SecretString};

use helpdesk_core::llm::gateway::ModelGateway;
use helpdesk_types::llm::{CompletionRequest, LlmError, ModelReply};

use types::{ChatResponse, to_chat_request, to_model_reply};

/// Chat completions gateway.
///
/// Deliberately not `Debug`: the struct holds the API key.
pub struct OpenAiCompatGateway {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    default_model: String,
}

impl OpenAiCompatGateway {
    /// Create a gateway for `base_url` (e.g. `https://api.openai.com/v1`).
    pub fn new(
        api_key: Option<SecretString>,
        base_url: impl Into<String>,
        default_model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::InvalidRequest(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            default_model: default_model.into(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

/// Map a non-success status to the gateway error taxonomy.
fn status_error(status: StatusCode, headers: &HeaderMap, body: String) -> LlmError {
    match status.as_u16() {
        401 | 403 => LlmError::AuthenticationFailed,
        429 => LlmError::RateLimited {
            retry_after_ms: retry_after_ms(headers),
        },
        503 | 529 => LlmError::Overloaded(body),
        _ => LlmError::Provider {
            message: format!("HTTP {status}: {body}"),
        },
    }
}

/// `Retry-After` in delay-seconds form, converted to milliseconds.
fn retry_after_ms(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(|secs| secs.saturating_mul(1000))
}

impl ModelGateway for OpenAiCompatGateway {
    fn name(&self) -> &str {
        "openai-compat"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<ModelReply, LlmError> {
        let body = to_chat_request(request, &self.default_model);

        let mut builder = self.client.post(self.url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Provider {
                    message: format!("HTTP request failed: {e}"),
                }
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "model gateway returned an error status");
            return Err(status_error(status, &headers, error_body));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        to_model_reply(chat)
    }
}
