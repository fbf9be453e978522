//! Configuration loader for the helpdesk agent.
//!
//! Reads `config.toml` from the data directory (`~/.helpdesk/` by default)
//! and deserializes it into [`AppConfig`]. A missing or malformed file falls
//! back to defaults; environment variables are applied on top.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use helpdesk_types::config::AppConfig;
use helpdesk_types::error::ConfigError;

pub const DATA_DIR_ENV: &str = "HELPDESK_DATA_DIR";
pub const API_KEY_ENV: &str = "HELPDESK_MODEL_API_KEY";
pub const BASE_URL_ENV: &str = "HELPDESK_MODEL_BASE_URL";
pub const MODEL_ENV: &str = "HELPDESK_MODEL";

/// Resolve the data directory.
///
/// Priority:
/// 1. `HELPDESK_DATA_DIR` environment variable
/// 2. `~/.helpdesk`
/// 3. `./.helpdesk`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".helpdesk");
    }
    PathBuf::from(".helpdesk")
}

/// Load configuration from `{data_dir}/config.toml`, then apply environment
/// overrides.
///
/// A missing file yields defaults quietly; an unreadable or malformed file
/// logs a warning and yields defaults.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config = match read_config_file(data_dir).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            tracing::debug!("No config.toml found in {}, using defaults", data_dir.display());
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("{err}, using defaults");
            AppConfig::default()
        }
    };
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Read and parse `{data_dir}/config.toml`. `Ok(None)` when the file does
/// not exist.
pub async fn read_config_file(data_dir: &Path) -> Result<Option<AppConfig>, ConfigError> {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(ConfigError::Read {
                path: config_path.display().to_string(),
                message: err.to_string(),
            });
        }
    };

    toml::from_str::<AppConfig>(&content)
        .map(Some)
        .map_err(|err| ConfigError::Parse {
            path: config_path.display().to_string(),
            message: err.to_string(),
        })
}

/// Apply `HELPDESK_MODEL_BASE_URL` and `HELPDESK_MODEL` from `lookup`.
/// Empty values are ignored.
pub fn apply_overrides(mut config: AppConfig, lookup: impl Fn(&str) -> Option<String>) -> AppConfig {
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(base_url) = non_empty(BASE_URL_ENV) {
        config.model.base_url = base_url;
    }
    if let Some(model) = non_empty(MODEL_ENV) {
        config.model.default_model = model;
    }
    config
}

/// The model API key from `HELPDESK_MODEL_API_KEY`, if set.
pub fn model_api_key() -> Option<SecretString> {
    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

/// Reject settings the controller cannot run with.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.agent.max_tool_iterations == 0 {
        return Err(ConfigError::Invalid(
            "agent.max_tool_iterations must be at least 1".to_string(),
        ));
    }
    if config.model.default_model.trim().is_empty() {
        return Err(ConfigError::Invalid(
            "model.default_model must not be empty".to_string(),
        ));
    }
    if let Err(err) = url::Url::parse(&config.model.base_url) {
        return Err(ConfigError::Invalid(format!(
            "model.base_url '{}' is not a valid URL: {err}",
            config.model.base_url
        )));
    }
    if config.search.allowed_domains.is_empty() {
        tracing::warn!("search.allowed_domains is empty; searchSite will refuse every URL");
    }
    Ok(())
}
