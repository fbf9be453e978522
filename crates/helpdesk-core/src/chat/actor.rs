//! Per-session worker tasks.
//!
//! Every active session has exactly one worker task that owns its
//! exchanges. Callers never touch session state directly; they send a
//! [`SessionCommand`] to the worker and await the oneshot reply. Commands
//! for one session therefore run strictly one after another, while
//! different sessions run on independent tasks.
//!
//! Workers retire themselves after an idle period. Sends and retirement
//! both happen under the registry's entry lock, so a command can never be
//! queued on a worker that has already decided to exit.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, info, info_span};

use helpdesk_types::chat::Turn;
use helpdesk_types::error::ExchangeError;
use helpdesk_types::exchange::ExchangeResult;
use helpdesk_types::session::SessionId;

use crate::agent::context::AgentContext;
use crate::agent::engine::AgentEngine;
use crate::repository::history::HistoryStore;
use crate::repository::session::SessionStore;

/// Work a session worker can be asked to do.
pub(crate) enum SessionCommand {
    Exchange {
        message: String,
        model: String,
        reply: oneshot::Sender<Result<ExchangeResult, ExchangeError>>,
    },
    Reset {
        reply: oneshot::Sender<Result<(), ExchangeError>>,
    },
}

/// Registry entry for a live worker.
pub(crate) struct ActorHandle {
    pub(crate) tx: mpsc::UnboundedSender<SessionCommand>,
    /// Distinguishes this worker from any later one for the same session.
    pub(crate) generation: u64,
}

pub(crate) type ActorRegistry = DashMap<SessionId, ActorHandle>;

/// Runs exchanges against the shared engine and store.
pub(crate) struct ExchangeRunner<S: SessionStore> {
    pub(crate) engine: AgentEngine,
    pub(crate) store: Arc<S>,
    pub(crate) exchange_timeout: Option<Duration>,
}

impl<S: SessionStore> ExchangeRunner<S> {
    /// One complete exchange: load, loop, commit.
    ///
    /// Nothing is written until the reply is final. Any error before the
    /// commit leaves the session exactly as it was.
    pub(crate) async fn exchange(
        &self,
        session_id: &SessionId,
        message: String,
        model: String,
    ) -> Result<ExchangeResult, ExchangeError> {
        let span = info_span!("exchange", session_id = %session_id, model = %model);
        async move {
            let history = HistoryStore::load(self.store.as_ref(), session_id).await?;
            let context = AgentContext::new(self.engine.system_prompt(), &history, &message);

            let run = self
                .engine
                .run(session_id, context, &model, self.store.as_ref());
            let outcome = match self.exchange_timeout {
                Some(limit) => tokio::time::timeout(limit, run)
                    .await
                    .map_err(|_| ExchangeError::Timeout(limit))??,
                None => run.await?,
            };

            let turns = [Turn::user(message), Turn::assistant(outcome.reply.clone())];
            self.store
                .commit_exchange(session_id, &turns, &outcome.memory_delta)
                .await?;

            info!(
                history_len = history.len() + turns.len(),
                tools_used = outcome.tools_used.len(),
                memory_writes = outcome.memory_delta.len(),
                "exchange committed"
            );

            Ok(ExchangeResult {
                reply: outcome.reply,
                tools_used: outcome.tools_used,
                memory_delta: outcome.memory_delta,
            })
        }
        .instrument(span)
        .await
    }

    pub(crate) async fn reset(&self, session_id: &SessionId) -> Result<(), ExchangeError> {
        self.store.reset(session_id).await?;
        info!(%session_id, "session reset");
        Ok(())
    }
}

/// Start a worker for `session_id` and return its registry handle.
pub(crate) fn spawn_actor<S: SessionStore + 'static>(
    session_id: SessionId,
    generation: u64,
    runner: Arc<ExchangeRunner<S>>,
    registry: Arc<ActorRegistry>,
    idle: Duration,
) -> ActorHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    debug!(%session_id, generation, "starting session worker");
    tokio::spawn(run_actor(session_id, generation, rx, runner, registry, idle));
    ActorHandle { tx, generation }
}

async fn run_actor<S: SessionStore + 'static>(
    session_id: SessionId,
    generation: u64,
    mut rx: mpsc::UnboundedReceiver<SessionCommand>,
    runner: Arc<ExchangeRunner<S>>,
    registry: Arc<ActorRegistry>,
    idle: Duration,
) {
    let mut pending: Option<SessionCommand> = None;
    loop {
        let command = match pending.take() {
            Some(command) => command,
            None => match tokio::time::timeout(idle, rx.recv()).await {
                Ok(Some(command)) => command,
                // Every sender is gone: the registry dropped this worker.
                Ok(None) => break,
                Err(_) => {
                    // Idle. Deregister only if nothing slipped in meanwhile;
                    // the check runs under the same lock senders take.
                    let mut raced = None;
                    registry.remove_if(&session_id, |_, handle| {
                        handle.generation == generation
                            && match rx.try_recv() {
                                Ok(command) => {
                                    raced = Some(command);
                                    false
                                }
                                Err(_) => true,
                            }
                    });
                    if raced.is_some() {
                        pending = raced;
                        continue;
                    }
                    debug!(%session_id, generation, "session worker idle, retiring");
                    break;
                }
            },
        };

        match command {
            SessionCommand::Exchange {
                message,
                model,
                reply,
            } => {
                let result = runner.exchange(&session_id, message, model).await;
                if reply.send(result).is_err() {
                    debug!(%session_id, "caller went away before the exchange finished");
                }
            }
            SessionCommand::Reset { reply } => {
                let result = runner.reset(&session_id).await;
                let _ = reply.send(result);
            }
        }
    }
}
