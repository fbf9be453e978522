//! Configuration types for the helpdesk agent.
//!
//! `AppConfig` represents the `config.toml` in the data directory. Every
//! field has a default, so an empty file (or no file) is a valid config.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Model gateway settings (any OpenAI-compatible chat completions endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used when a request does not choose one.
    #[serde(default = "default_model")]
    pub default_model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_request_timeout_secs() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Tool loop and session worker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model calls allowed per exchange before the fallback reply is used.
    #[serde(default = "default_max_tool_iterations")]
    pub max_tool_iterations: u32,
    /// Optional wall-clock budget for the model/tool loop of one exchange.
    #[serde(default)]
    pub exchange_timeout_secs: Option<u64>,
    /// Idle time after which a session worker is retired. Session data is
    /// untouched; the next message starts a fresh worker.
    #[serde(default = "default_actor_idle_secs")]
    pub actor_idle_secs: u64,
}

fn default_max_tool_iterations() -> u32 {
    5
}

fn default_actor_idle_secs() -> u64 {
    300
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_tool_iterations: default_max_tool_iterations(),
            exchange_timeout_secs: None,
            actor_idle_secs: default_actor_idle_secs(),
        }
    }
}

/// `searchSite` tool policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Hosts the tool may fetch. A host matches an entry when it equals the
    /// entry or is a subdomain of it.
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    /// Maximum characters of extracted text returned to the model.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
}

fn default_allowed_domains() -> Vec<String> {
    [
        "wikipedia.org",
        "developer.mozilla.org",
        "docs.rs",
        "rust-lang.org",
        "cloudflare.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_chars() -> usize {
    2000
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            allowed_domains: default_allowed_domains(),
            max_chars: default_max_chars(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
