//! SessionController: the entry point for exchanges.

use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures_util::Stream;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use helpdesk_types::chat::Turn;
use helpdesk_types::config::AppConfig;
use helpdesk_types::error::ExchangeError;
use helpdesk_types::exchange::{ExchangeEvent, ExchangeResult};
use helpdesk_types::memory::MemoryEntry;
use helpdesk_types::session::SessionId;

use crate::agent::engine::AgentEngine;
use crate::repository::history::HistoryStore;
use crate::repository::memory::MemoryStore;
use crate::repository::session::SessionStore;

use super::actor::{ActorHandle, ActorRegistry, ExchangeRunner, SessionCommand, spawn_actor};
use super::segment::segment_reply;

/// Message returned for an empty or whitespace-only user message.
pub const MISSING_MESSAGE: &str = "Missing message";

/// Controller-level settings.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Model used when a request does not name one.
    pub default_model: String,
    /// Wall-clock budget for the model/tool loop of one exchange.
    pub exchange_timeout: Option<Duration>,
    /// How long a session worker waits for work before retiring.
    pub actor_idle: Duration,
}

impl ControllerSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_model: config.model.default_model.clone(),
            exchange_timeout: config.agent.exchange_timeout_secs.map(Duration::from_secs),
            actor_idle: Duration::from_secs(config.agent.actor_idle_secs),
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Runs exchanges for any number of sessions, one at a time per session.
///
/// Cheap to clone; clones share the same workers, engine, and store.
pub struct SessionController<S: SessionStore + 'static> {
    runner: Arc<ExchangeRunner<S>>,
    actors: Arc<ActorRegistry>,
    next_generation: Arc<AtomicU64>,
    default_model: Arc<str>,
    actor_idle: Duration,
}

impl<S: SessionStore + 'static> Clone for SessionController<S> {
    fn clone(&self) -> Self {
        Self {
            runner: Arc::clone(&self.runner),
            actors: Arc::clone(&self.actors),
            next_generation: Arc::clone(&self.next_generation),
            default_model: Arc::clone(&self.default_model),
            actor_idle: self.actor_idle,
        }
    }
}

impl<S: SessionStore + 'static> SessionController<S> {
    pub fn new(engine: AgentEngine, store: Arc<S>, settings: ControllerSettings) -> Self {
        Self {
            runner: Arc::new(ExchangeRunner {
                engine,
                store,
                exchange_timeout: settings.exchange_timeout,
            }),
            actors: Arc::new(ActorRegistry::new()),
            next_generation: Arc::new(AtomicU64::new(0)),
            default_model: Arc::from(settings.default_model),
            actor_idle: settings.actor_idle,
        }
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Number of sessions with a live worker.
    pub fn active_sessions(&self) -> usize {
        self.actors.len()
    }

    /// Run one buffered exchange.
    ///
    /// `model` overrides the default model for this exchange only. On error
    /// no turn is recorded and the caller may retry the same message.
    pub async fn handle(
        &self,
        session_id: &SessionId,
        message: &str,
        model: Option<&str>,
    ) -> Result<ExchangeResult, ExchangeError> {
        if message.trim().is_empty() {
            return Err(ExchangeError::Validation(MISSING_MESSAGE.to_string()));
        }
        let model = model
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(&*self.default_model)
            .to_string();

        let (reply, rx) = oneshot::channel();
        self.dispatch(
            session_id,
            SessionCommand::Exchange {
                message: message.to_string(),
                model,
                reply,
            },
        )?;
        rx.await.map_err(|_| worker_stopped())?
    }

    /// Run one exchange and deliver it as events.
    ///
    /// The exchange completes (and is persisted) before the first token is
    /// emitted. Dropping the stream early stops emission but does not undo
    /// the exchange.
    pub fn handle_streaming(
        &self,
        session_id: SessionId,
        message: String,
        model: Option<String>,
    ) -> Pin<Box<dyn Stream<Item = ExchangeEvent> + Send + 'static>> {
        let controller = self.clone();
        Box::pin(async_stream::stream! {
            match controller.handle(&session_id, &message, model.as_deref()).await {
                Ok(result) => {
                    for token in segment_reply(&result.reply) {
                        yield ExchangeEvent::Token(token);
                    }
                    yield ExchangeEvent::Done {
                        tools_used: result.tools_used,
                        memory_delta: result.memory_delta,
                    };
                }
                Err(err) => {
                    debug!(%session_id, error = %err, "streamed exchange failed");
                    yield ExchangeEvent::Error(err.to_string());
                }
            }
        })
    }

    /// Erase the session's history and memory. Idempotent.
    ///
    /// Queued behind any exchange already running for the session.
    pub async fn reset(&self, session_id: &SessionId) -> Result<(), ExchangeError> {
        let (reply, rx) = oneshot::channel();
        self.dispatch(session_id, SessionCommand::Reset { reply })?;
        rx.await.map_err(|_| worker_stopped())?
    }

    /// Persisted history. Reads the store directly, so an exchange in
    /// flight is not visible until it commits.
    pub async fn history(&self, session_id: &SessionId) -> Result<Vec<Turn>, ExchangeError> {
        Ok(HistoryStore::load(self.runner.store.as_ref(), session_id).await?)
    }

    /// Persisted memory entries, ordered by key.
    pub async fn memory(&self, session_id: &SessionId) -> Result<Vec<MemoryEntry>, ExchangeError> {
        Ok(MemoryStore::list(self.runner.store.as_ref(), session_id).await?)
    }

    fn dispatch(&self, session_id: &SessionId, command: SessionCommand) -> Result<(), ExchangeError> {
        let mut handle = self
            .actors
            .entry(session_id.clone())
            .or_insert_with(|| self.spawn(session_id));
        if let Err(mpsc::error::SendError(command)) = handle.tx.send(command) {
            // The worker died without deregistering; replace it.
            debug!(%session_id, generation = handle.generation, "replacing dead session worker");
            *handle = self.spawn(session_id);
            handle.tx.send(command).map_err(|_| worker_stopped())?;
        }
        Ok(())
    }

    fn spawn(&self, session_id: &SessionId) -> ActorHandle {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        spawn_actor(
            session_id.clone(),
            generation,
            Arc::clone(&self.runner),
            Arc::clone(&self.actors),
            self.actor_idle,
        )
    }
}

fn worker_stopped() -> ExchangeError {
    ExchangeError::Unavailable("session worker stopped before replying".to_string())
}
