use std::time::Duration;

use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in helpdesk-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("query error: {0}")]
    Query(String),
}

/// Errors surfaced by one exchange.
///
/// Tool failures never appear here: they are recovered inside the tool
/// loop and fed back to the model. Every variant below means no new turn
/// was recorded and the caller may retry the same message.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// The request was rejected before any state was touched.
    #[error("{0}")]
    Validation(String),

    /// The model gateway failed or timed out.
    #[error("model gateway error: {0}")]
    Gateway(#[from] LlmError),

    /// Loading or persisting session state failed.
    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    /// The exchange exceeded its wall-clock budget.
    #[error("exchange timed out after {0:?}")]
    Timeout(Duration),

    /// The session worker stopped before answering.
    #[error("session worker unavailable: {0}")]
    Unavailable(String),
}

impl ExchangeError {
    /// Whether this is a caller-facing validation failure rather than a
    /// controller failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, ExchangeError::Validation(_))
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_exchange_error_from_llm() {
        let err: ExchangeError = LlmError::AuthenticationFailed.into();
        assert_eq!(err.to_string(), "model gateway error: authentication failed");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_timeout_keeps_sub_second_budget() {
        let err = ExchangeError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "exchange timed out after 250ms");
        let err = ExchangeError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "exchange timed out after 1.5s");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::Parse {
            path: "/tmp/config.toml".to_string(),
            message: "expected `=`".to_string(),
        };
        assert_eq!(err.to_string(), "failed to parse /tmp/config.toml: expected `=`");
    }

    #[test]
    fn test_validation_error_displays_message_verbatim() {
        let err = ExchangeError::Validation("Missing message".to_string());
        assert_eq!(err.to_string(), "Missing message");
        assert!(err.is_validation());
    }
}
