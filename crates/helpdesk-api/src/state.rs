//! Application state wiring the controller to its concrete backends.
//!
//! The controller is generic over its session store; AppState pins it to
//! the SQLite implementation. Gateway and fetcher are already type-erased.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use helpdesk_core::agent::engine::{AgentEngine, EngineSettings};
use helpdesk_core::agent::prompt::SystemPromptBuilder;
use helpdesk_core::chat::controller::{ControllerSettings, SessionController};
use helpdesk_core::llm::box_gateway::BoxModelGateway;
use helpdesk_core::tools::fetch::BoxPageFetcher;
use helpdesk_core::tools::registry::ToolRegistry;
use helpdesk_core::tools::search::{DomainAllowlist, SearchSiteTool};
use helpdesk_infra::config::model_api_key;
use helpdesk_infra::llm::openai_compat::OpenAiCompatGateway;
use helpdesk_infra::sqlite::pool::{DatabasePool, database_url};
use helpdesk_infra::sqlite::session::SqliteSessionStore;
use helpdesk_infra::web::fetcher::HttpPageFetcher;
use helpdesk_types::config::AppConfig;

pub type ConcreteController = SessionController<SqliteSessionStore>;

/// Shared application state, used by both CLI commands and HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: ConcreteController,
    pub config: Arc<AppConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Open the database under `data_dir` and wire the live gateway and
    /// page fetcher.
    pub async fn init(config: AppConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::new(&database_url(&data_dir)).await?;
        let store = SqliteSessionStore::new(db_pool);

        if model_api_key().is_none() {
            tracing::warn!("HELPDESK_MODEL_API_KEY is not set; sending requests without a key");
        }
        let gateway = OpenAiCompatGateway::new(
            model_api_key(),
            config.model.base_url.clone(),
            config.model.default_model.clone(),
            Duration::from_secs(config.model.request_timeout_secs),
        )?;

        let allowlist = DomainAllowlist::new(&config.search.allowed_domains);
        let fetcher = HttpPageFetcher::new(
            allowlist,
            Duration::from_secs(config.search.fetch_timeout_secs),
        )?;

        Ok(Self::from_parts(
            config,
            data_dir,
            BoxModelGateway::new(gateway),
            BoxPageFetcher::new(fetcher),
            store,
        ))
    }

    /// Assemble state from already-built backends.
    pub fn from_parts(
        config: AppConfig,
        data_dir: PathBuf,
        gateway: BoxModelGateway,
        fetcher: BoxPageFetcher,
        store: SqliteSessionStore,
    ) -> Self {
        let allowlist = DomainAllowlist::new(&config.search.allowed_domains);
        let system_prompt = SystemPromptBuilder::build(allowlist.domains());
        let search = SearchSiteTool::new(allowlist, fetcher, config.search.max_chars);

        let engine = AgentEngine::new(
            gateway,
            ToolRegistry::new(search),
            system_prompt,
            EngineSettings {
                max_tool_iterations: config.agent.max_tool_iterations,
                max_tokens: config.model.max_tokens,
            },
        );

        let controller = SessionController::new(
            engine,
            Arc::new(store),
            ControllerSettings::from_config(&config),
        );

        Self {
            controller,
            config: Arc::new(config),
            data_dir,
        }
    }
}
