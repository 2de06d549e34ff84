//! Runtime for live sessions
//!
//! Each session runs as its own task owning its log and turn state. The
//! manager only keeps handles; everything else goes through channels.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::SessionRuntime;
pub use traits::*;

use crate::conversation::{ConversationLog, Message};
use crate::error::{ErrorKind, TurnError};
use crate::persona::{default_case_context, Flow};
use crate::state_machine::{Event, SessionContext, TurnState};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

/// How long a session may go without commands before it ends itself
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Commands accepted by a session runtime
#[derive(Debug)]
pub enum SessionCommand {
    /// Run a UI event; the reply resolves once any AI turn it started settles
    Dispatch {
        event: Event,
        reply: oneshot::Sender<Result<SessionSnapshot, TurnError>>,
    },
    Snapshot {
        reply: oneshot::Sender<SessionSnapshot>,
    },
    /// Snapshot and receiver taken together so no event falls in between
    Subscribe {
        reply: oneshot::Sender<(SessionSnapshot, broadcast::Receiver<SseEvent>)>,
    },
}

/// Events sent to SSE clients
#[derive(Debug, Clone)]
pub enum SseEvent {
    Init {
        snapshot: SessionSnapshot,
    },
    Message {
        message: serde_json::Value,
    },
    StateChange {
        /// State name plus state data, e.g. `{"state":"error","state_data":{...}}`
        state: serde_json::Value,
    },
    ReplyDone,
    Error {
        message: String,
        kind: ErrorKind,
    },
}

/// Everything a client needs to render a session
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub flow: Flow,
    pub state: TurnState,
    /// Transcript in arrival order, seed greeting first
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub case_context: Option<String>,
}

/// Handle to interact with a running session
struct SessionHandle {
    command_tx: mpsc::Sender<SessionCommand>,
}

/// Manager for all live sessions
pub struct SessionManager {
    llm: Arc<dyn LlmClient>,
    sessions: Arc<RwLock<HashMap<String, SessionHandle>>>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// The client shared by every session and the advisor flow
    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    /// Start a coaching or facilitation session seeded with its greeting
    pub async fn create_session(
        &self,
        flow: Flow,
        case_context: Option<String>,
    ) -> Result<SessionSnapshot, TurnError> {
        if !flow.is_dialogue() {
            return Err(TurnError::UnsupportedAction(format!(
                "the {flow} flow has no sessions"
            )));
        }

        let log = ConversationLog::with_greeting(flow)?;
        let case_context = match flow {
            Flow::Facilitation => Some(
                case_context
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(default_case_context),
            ),
            _ => None,
        };

        let session_id = uuid::Uuid::new_v4().to_string();
        let context = SessionContext::new(&session_id, flow, self.llm.has_credential());

        let (command_tx, command_rx) = mpsc::channel(32);
        let (broadcast_tx, _) = broadcast::channel(128);

        let runtime = SessionRuntime::new(
            context,
            log,
            case_context,
            self.llm.clone(),
            command_rx,
            broadcast_tx,
            self.idle_timeout,
        );
        let snapshot = runtime.snapshot();

        // Registered before the task starts so an early exit still finds it
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), SessionHandle { command_tx });

        let id = session_id.clone();
        let sessions = Arc::clone(&self.sessions);
        tokio::spawn(async move {
            runtime.run().await;
            // No-op when end_session already removed the handle
            sessions.write().await.remove(&id);
            tracing::info!(session_id = %id, "Session runtime finished");
        });

        tracing::info!(session_id = %session_id, flow = %flow, "Session created");
        Ok(snapshot)
    }

    /// Send a UI event to a session and wait for the turn to settle
    pub async fn dispatch(
        &self,
        session_id: &str,
        event: Event,
    ) -> Result<SessionSnapshot, TurnError> {
        self.request(session_id, |reply| SessionCommand::Dispatch { event, reply })
            .await?
    }

    pub async fn snapshot(&self, session_id: &str) -> Result<SessionSnapshot, TurnError> {
        self.request(session_id, |reply| SessionCommand::Snapshot { reply })
            .await
    }

    /// Subscribe to session updates
    pub async fn subscribe(
        &self,
        session_id: &str,
    ) -> Result<(SessionSnapshot, broadcast::Receiver<SseEvent>), TurnError> {
        self.request(session_id, |reply| SessionCommand::Subscribe { reply })
            .await
    }

    /// Drop a session; its runtime exits and its log is discarded
    pub async fn end_session(&self, session_id: &str) -> Result<(), TurnError> {
        if self.sessions.write().await.remove(session_id).is_none() {
            return Err(TurnError::SessionNotFound(session_id.to_string()));
        }
        tracing::info!(session_id = %session_id, "Session ended");
        Ok(())
    }

    async fn request<T>(
        &self,
        session_id: &str,
        command: impl FnOnce(oneshot::Sender<T>) -> SessionCommand,
    ) -> Result<T, TurnError> {
        let not_found = || TurnError::SessionNotFound(session_id.to_string());

        let command_tx = self
            .sessions
            .read()
            .await
            .get(session_id)
            .map(|handle| handle.command_tx.clone())
            .ok_or_else(not_found)?;

        let (reply_tx, reply_rx) = oneshot::channel();
        command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| not_found())?;
        reply_rx.await.map_err(|_| not_found())
    }
}
