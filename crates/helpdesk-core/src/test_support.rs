//! In-process fakes for the core ports, shared by unit tests.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use url::Url;

use helpdesk_types::chat::Turn;
use helpdesk_types::error::RepositoryError;
use helpdesk_types::llm::{CompletionRequest, LlmError, MessageRole, ModelReply, ToolCall};
use helpdesk_types::memory::{MemoryDelta, MemoryEntry};
use helpdesk_types::session::SessionId;

use crate::llm::gateway::ModelGateway;
use crate::repository::history::HistoryStore;
use crate::repository::memory::MemoryStore;
use crate::repository::session::SessionStore;
use crate::tools::ToolError;
use crate::tools::fetch::PageFetcher;

pub fn sid(s: &str) -> SessionId {
    s.parse().unwrap()
}

pub fn call(id: &str, name: &str, arguments: serde_json::Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

// ---------------------------------------------------------------------------
// Session store
// ---------------------------------------------------------------------------

#[derive(Default)]
struct StoreState {
    history: HashMap<SessionId, Vec<Turn>>,
    memory: HashMap<SessionId, BTreeMap<String, String>>,
}

/// Cloneable in-memory `SessionStore`; clones share state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    fail_writes: Arc<AtomicBool>,
    fail_reads: Arc<AtomicBool>,
    commits: Arc<AtomicUsize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }

    pub fn turns(&self, session: &SessionId) -> Vec<Turn> {
        let state = self.state.lock().unwrap();
        state.history.get(session).cloned().unwrap_or_default()
    }

    pub fn memory(&self, session: &SessionId) -> BTreeMap<String, String> {
        let state = self.state.lock().unwrap();
        state.memory.get(session).cloned().unwrap_or_default()
    }

    fn read_guard(&self) -> Result<(), RepositoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("injected read failure".to_string()));
        }
        Ok(())
    }

    fn write_guard(&self) -> Result<(), RepositoryError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("injected write failure".to_string()));
        }
        Ok(())
    }
}

impl HistoryStore for InMemoryStore {
    fn load(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Vec<Turn>, RepositoryError>> + Send {
        let result = self.read_guard().map(|_| self.turns(session_id));
        async move { result }
    }

    fn append(
        &self,
        session_id: &SessionId,
        turns: &[Turn],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.write_guard().map(|_| {
            let mut state = self.state.lock().unwrap();
            state
                .history
                .entry(session_id.clone())
                .or_default()
                .extend_from_slice(turns);
        });
        async move { result }
    }

    fn clear(&self, session_id: &SessionId) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.write_guard().map(|_| {
            self.state.lock().unwrap().history.remove(session_id);
        });
        async move { result }
    }
}

impl MemoryStore for InMemoryStore {
    fn get(
        &self,
        session_id: &SessionId,
        key: &str,
    ) -> impl Future<Output = Result<Option<String>, RepositoryError>> + Send {
        let result = self
            .read_guard()
            .map(|_| self.memory(session_id).get(key).cloned());
        async move { result }
    }

    fn set(
        &self,
        session_id: &SessionId,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.write_guard().map(|_| {
            let mut state = self.state.lock().unwrap();
            state
                .memory
                .entry(session_id.clone())
                .or_default()
                .insert(key.to_string(), value.to_string());
        });
        async move { result }
    }

    fn list(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Vec<MemoryEntry>, RepositoryError>> + Send {
        let result = self.read_guard().map(|_| {
            self.memory(session_id)
                .into_iter()
                .map(|(key, value)| MemoryEntry {
                    session_id: session_id.clone(),
                    key,
                    value,
                    updated_at: Utc::now(),
                })
                .collect()
        });
        async move { result }
    }

    fn clear(&self, session_id: &SessionId) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.write_guard().map(|_| {
            self.state.lock().unwrap().memory.remove(session_id);
        });
        async move { result }
    }
}

impl SessionStore for InMemoryStore {
    fn commit_exchange(
        &self,
        session_id: &SessionId,
        turns: &[Turn],
        writes: &MemoryDelta,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = self.write_guard().map(|_| {
            let mut state = self.state.lock().unwrap();
            let memory = state.memory.entry(session_id.clone()).or_default();
            for (key, value) in writes {
                memory.insert(key.clone(), value.clone());
            }
            state
                .history
                .entry(session_id.clone())
                .or_default()
                .extend_from_slice(turns);
            self.commits.fetch_add(1, Ordering::SeqCst);
        });
        async move { result }
    }
}

// ---------------------------------------------------------------------------
// Model gateways
// ---------------------------------------------------------------------------

/// Replays a fixed script of replies and records every request.
#[derive(Clone, Default)]
pub struct ScriptedGateway {
    script: Arc<Mutex<VecDeque<Result<ModelReply, LlmError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedGateway {
    pub fn new(script: Vec<Result<ModelReply, LlmError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            requests: Arc::default(),
        }
    }

    pub fn push(&self, reply: Result<ModelReply, LlmError>) {
        self.script.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl ModelGateway for ScriptedGateway {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<ModelReply, LlmError>> + Send {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        async move {
            next.unwrap_or_else(|| {
                Err(LlmError::Provider {
                    message: "script exhausted".to_string(),
                })
            })
        }
    }
}

/// Answers every request with the last user message, after an optional delay.
#[derive(Clone, Default)]
pub struct EchoGateway {
    pub delay: Option<Duration>,
}

impl ModelGateway for EchoGateway {
    fn name(&self) -> &str {
        "echo"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<ModelReply, LlmError>> + Send {
        let last_user = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User)
            .map(|m| m.content.clone())
            .unwrap_or_default();
        let delay = self.delay;
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            Ok(ModelReply::Final(format!("echo: {last_user}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Page fetcher
// ---------------------------------------------------------------------------

/// Serves a fixed body and records each URL it was asked for.
#[derive(Clone, Default)]
pub struct RecordingFetcher {
    pub body: String,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingFetcher {
    pub fn with_body(body: &str) -> Self {
        Self {
            body: body.to_string(),
            seen: Arc::default(),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

impl PageFetcher for RecordingFetcher {
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<String, ToolError>> + Send {
        self.seen.lock().unwrap().push(url.to_string());
        let body = self.body.clone();
        async move { Ok(body) }
    }
}
