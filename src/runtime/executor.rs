//! Session runtime executor

use super::traits::LlmClient;
use super::{SessionCommand, SessionSnapshot, SseEvent};

use crate::conversation::{ConversationLog, Message};
use crate::error::TurnError;
use crate::prompt::dialogue_request;
use crate::state_machine::{transition, Effect, Event, SessionContext, TurnState};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};

type TurnReply = oneshot::Sender<Result<SessionSnapshot, TurnError>>;

/// Owns one session's log and turn state
pub struct SessionRuntime<L>
where
    L: LlmClient + ?Sized + 'static,
{
    context: SessionContext,
    state: TurnState,
    log: ConversationLog,
    /// Case profile shared by the facilitation persona
    case_context: Option<String>,
    llm_client: Arc<L>,
    command_rx: mpsc::Receiver<SessionCommand>,
    /// Model outcomes come back on this channel
    event_rx: mpsc::Receiver<Event>,
    event_tx: mpsc::Sender<Event>,
    broadcast_tx: broadcast::Sender<SseEvent>,
    /// Quiet period after which the session ends itself
    idle_timeout: Duration,
    /// Caller of the turn whose AI reply is still outstanding
    pending_reply: Option<TurnReply>,
    /// Failure reported while settling the current turn
    failure: Option<TurnError>,
}

impl<L> SessionRuntime<L>
where
    L: LlmClient + ?Sized + 'static,
{
    pub fn new(
        context: SessionContext,
        log: ConversationLog,
        case_context: Option<String>,
        llm_client: Arc<L>,
        command_rx: mpsc::Receiver<SessionCommand>,
        broadcast_tx: broadcast::Sender<SseEvent>,
        idle_timeout: Duration,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(8);
        Self {
            context,
            state: TurnState::Idle,
            log,
            case_context,
            llm_client,
            command_rx,
            event_rx,
            event_tx,
            broadcast_tx,
            idle_timeout,
            pending_reply: None,
            failure: None,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.context.session_id.clone(),
            flow: self.context.flow,
            state: self.state.clone(),
            messages: self.log.render().to_vec(),
            case_context: self.case_context.clone(),
        }
    }

    pub async fn run(mut self) {
        tracing::info!(session_id = %self.context.session_id, flow = %self.context.flow, "Starting session runtime");

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                Some(event) = self.event_rx.recv() => {
                    if let Err(e) = self.process_event(event) {
                        tracing::error!(session_id = %self.context.session_id, error = %e, "Error handling model outcome");
                    }
                    self.settle();
                }
                // Never while a caller is still waiting on an AI turn
                () = tokio::time::sleep(self.idle_timeout), if self.pending_reply.is_none() => {
                    tracing::info!(
                        session_id = %self.context.session_id,
                        idle_secs = self.idle_timeout.as_secs(),
                        "Session idle, ending"
                    );
                    break;
                }
            }
        }

        tracing::info!(session_id = %self.context.session_id, messages = self.log.len(), "Session runtime stopped");
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Dispatch { event, reply } => {
                self.context.credential_available = self.llm_client.has_credential();
                let event_name = event.name();
                match self.process_event(event) {
                    Ok(()) => {
                        self.pending_reply = Some(reply);
                        self.settle();
                    }
                    Err(e) => {
                        tracing::info!(
                            session_id = %self.context.session_id,
                            event = event_name,
                            kind = ?e.kind(),
                            "Turn rejected"
                        );
                        let _ = reply.send(Err(e));
                    }
                }
            }
            SessionCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
            SessionCommand::Subscribe { reply } => {
                let _ = reply.send((self.snapshot(), self.broadcast_tx.subscribe()));
            }
        }
    }

    fn process_event(&mut self, event: Event) -> Result<(), TurnError> {
        let event_name = event.name();

        // Pure state transition
        let result = transition(&self.state, &self.context, event)?;

        tracing::debug!(
            session_id = %self.context.session_id,
            event = event_name,
            from = self.state.as_str(),
            to = result.new_state.as_str(),
            "Transition"
        );

        let old_state = std::mem::replace(&mut self.state, result.new_state);

        for effect in result.effects {
            if let Err(e) = self.execute_effect(effect) {
                self.state = old_state;
                return Err(e);
            }
        }

        Ok(())
    }

    /// Answer the waiting caller once no reply is outstanding
    fn settle(&mut self) {
        if !self.state.accepts_turns() {
            return;
        }
        let failure = self.failure.take();
        if let Some(reply) = self.pending_reply.take() {
            let outcome = match failure {
                Some(error) => Err(error),
                None => Ok(self.snapshot()),
            };
            let _ = reply.send(outcome);
        }
    }

    fn execute_effect(&mut self, effect: Effect) -> Result<(), TurnError> {
        match effect {
            Effect::AppendMessage { role, content } => {
                let label = self
                    .context
                    .flow
                    .speaker_label(role)
                    .ok_or_else(|| TurnError::InvalidRole(role.as_str().to_string()))?;
                let message = self.log.append(Message::new(role, label, content))?;

                let message_json = serde_json::to_value(message).unwrap_or(Value::Null);
                let _ = self.broadcast_tx.send(SseEvent::Message {
                    message: message_json,
                });
                Ok(())
            }

            Effect::RequestLlm => {
                let request = dialogue_request(&self.log, self.case_context.as_deref());
                let llm_client = self.llm_client.clone();
                let event_tx = self.event_tx.clone();
                let session_id = self.context.session_id.clone();

                tokio::spawn(async move {
                    tracing::info!(
                        session_id = %session_id,
                        model = %llm_client.model_id(),
                        messages = request.messages.len(),
                        "Requesting AI turn"
                    );

                    let event = match llm_client.complete(&request).await {
                        Ok(response) => Event::LlmReply {
                            text: response.text(),
                        },
                        Err(e) => Event::LlmFailed {
                            error: TurnError::RemoteGeneration(e.message),
                        },
                    };
                    let _ = event_tx.send(event).await;
                });
                Ok(())
            }

            Effect::NotifyClient { event_type, data } => {
                let sse_event = match event_type.as_str() {
                    "state_change" => SseEvent::StateChange { state: data },
                    "reply_done" => SseEvent::ReplyDone,
                    other => {
                        tracing::warn!(event_type = other, "Unknown notification type");
                        return Ok(());
                    }
                };
                let _ = self.broadcast_tx.send(sse_event);
                Ok(())
            }

            Effect::ReportFailure { error } => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    error = %error,
                    "AI turn failed"
                );
                let _ = self.broadcast_tx.send(SseEvent::Error {
                    message: error.to_string(),
                    kind: error.kind(),
                });
                self.failure = Some(error);
                Ok(())
            }
        }
    }
}
