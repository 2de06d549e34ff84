//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use super::traits::*;
use crate::llm::{LlmError, LlmRequest, LlmResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

// ============================================================================
// Mock LLM Client
// ============================================================================

/// Mock LLM client that returns queued responses
#[allow(dead_code)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    credential: AtomicBool,
    /// When set, every call waits for one notification before answering
    gate: Option<Arc<Notify>>,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmClient {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            credential: AtomicBool::new(true),
            gate: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Behave as if no API key were configured
    pub fn without_credential(self) -> Self {
        self.credential.store(false, Ordering::SeqCst);
        self
    }

    /// Hold every call until `gate` is notified
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn set_credential(&self, present: bool) {
        self.credential.store(present, Ordering::SeqCst);
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a text reply
    pub fn queue_text(&self, text: &str) {
        self.queue_response(LlmResponse::from_text(text));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn has_credential(&self) -> bool {
        self.credential.load(Ordering::SeqCst)
    }
}

// ============================================================================
// Session scenario tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Role;
    use crate::error::TurnError;
    use crate::llm::MessageRole;
    use crate::persona::{Flow, COACHING_PREAMBLE};
    use crate::runtime::{SessionManager, SseEvent};
    use crate::state_machine::{Event, TurnState};
    use std::time::Duration;

    fn manager(llm: &Arc<MockLlmClient>) -> SessionManager {
        SessionManager::new(llm.clone())
    }

    #[tokio::test]
    async fn test_coaching_scenario() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("What part of the work feels heaviest right now?");
        let sessions = manager(&llm);

        let created = sessions.create_session(Flow::Coaching, None).await.unwrap();
        assert_eq!(created.messages.len(), 1);
        let seed = created.messages[0].content().to_string();

        let snapshot = sessions
            .dispatch(
                &created.session_id,
                Event::human(Role::HumanPrimary, "I feel stuck"),
            )
            .await
            .unwrap();

        assert_eq!(snapshot.state, TurnState::Idle);
        let roles: Vec<_> = snapshot.messages.iter().map(|m| m.role()).collect();
        assert_eq!(roles, [Role::Assistant, Role::HumanPrimary, Role::Assistant]);
        assert_eq!(snapshot.messages[1].content(), "I feel stuck");
        assert_eq!(snapshot.messages[1].speaker_label(), "You");
        assert_eq!(snapshot.messages[2].speaker_label(), "Coach");

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 1);
        let history = &requests[0].messages;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, MessageRole::User);
        assert_eq!(history[0].text, COACHING_PREAMBLE);
        assert_eq!(history[1].role, MessageRole::Assistant);
        assert_eq!(history[1].text, seed);
        assert_eq!(history[2].role, MessageRole::User);
        assert_eq!(history[2].text, "I feel stuck");
    }

    #[tokio::test]
    async fn test_facilitation_scenario() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("You both seem to value keeping things running safely.");
        let sessions = manager(&llm);

        let created = sessions
            .create_session(Flow::Facilitation, None)
            .await
            .unwrap();
        let id = created.session_id;
        assert!(created.case_context.is_some());

        sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "How has the course been?"))
            .await
            .unwrap();
        let snapshot = sessions
            .dispatch(&id, Event::human(Role::HumanSecondary, "Honestly, slow going."))
            .await
            .unwrap();

        assert_eq!(snapshot.messages.len(), 3);
        assert!(llm.recorded_requests().is_empty());

        let snapshot = sessions
            .dispatch(&id, Event::FacilitationRequested)
            .await
            .unwrap();
        assert_eq!(snapshot.messages.len(), 4);
        assert_eq!(snapshot.messages[3].role(), Role::Assistant);
        assert_eq!(snapshot.messages[3].speaker_label(), "AI Facilitator");

        let requests = llm.recorded_requests();
        assert_eq!(requests.len(), 1);
        let prompt = &requests[0].messages[0].text;
        assert!(prompt.contains("Career Counselor: How has the course been?"));
        assert!(prompt.contains("Employee: Honestly, slow going."));
        assert!(prompt.contains(snapshot.messages[0].content()));
        assert!(prompt.ends_with("[AI Facilitator]:"));
    }

    #[tokio::test]
    async fn test_custom_case_context_reaches_prompt() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("Noted.");
        let sessions = manager(&llm);

        let created = sessions
            .create_session(
                Flow::Facilitation,
                Some("  Former ship engineer moving into logistics  ".to_string()),
            )
            .await
            .unwrap();
        assert_eq!(
            created.case_context.as_deref(),
            Some("Former ship engineer moving into logistics")
        );

        sessions
            .dispatch(&created.session_id, Event::FacilitationRequested)
            .await
            .unwrap();
        let requests = llm.recorded_requests();
        assert!(requests[0].messages[0]
            .text
            .contains("Former ship engineer moving into logistics"));
    }

    #[tokio::test]
    async fn test_failed_reply_keeps_human_turn_only() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_error(LlmError::server_error("HTTP 503"));
        let sessions = manager(&llm);
        let id = sessions
            .create_session(Flow::Coaching, None)
            .await
            .unwrap()
            .session_id;

        let err = sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "hello"))
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::RemoteGeneration("HTTP 503".to_string()));

        let snapshot = sessions.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.messages.len(), 2);
        assert_eq!(snapshot.messages[1].role(), Role::HumanPrimary);
        assert!(matches!(snapshot.state, TurnState::Error { .. }));

        // Retrying is re-issuing the action
        llm.queue_text("Let's try that again.");
        let snapshot = sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "hello again"))
            .await
            .unwrap();
        assert_eq!(snapshot.messages.len(), 4);
        assert_eq!(snapshot.state, TurnState::Idle);
    }

    #[tokio::test]
    async fn test_empty_model_reply_is_remote_error() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("   ");
        let sessions = manager(&llm);
        let id = sessions
            .create_session(Flow::Facilitation, None)
            .await
            .unwrap()
            .session_id;

        let err = sessions
            .dispatch(&id, Event::FacilitationRequested)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::RemoteGeneration(_)));
        assert_eq!(sessions.snapshot(&id).await.unwrap().messages.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_credential_leaves_log_untouched() {
        let llm = Arc::new(MockLlmClient::new("mock").without_credential());
        let sessions = manager(&llm);
        let id = sessions
            .create_session(Flow::Coaching, None)
            .await
            .unwrap()
            .session_id;

        let err = sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "hello"))
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::MissingCredential);
        assert_eq!(sessions.snapshot(&id).await.unwrap().messages.len(), 1);
        assert!(llm.recorded_requests().is_empty());

        // A key entered later is picked up by the same session
        llm.set_credential(true);
        llm.queue_text("Welcome back.");
        let snapshot = sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "hello"))
            .await
            .unwrap();
        assert_eq!(snapshot.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_rejected_inputs_do_not_append() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        let sessions = manager(&llm);
        let id = sessions
            .create_session(Flow::Coaching, None)
            .await
            .unwrap()
            .session_id;

        let err = sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "  "))
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::EmptyInput);

        let err = sessions
            .dispatch(&id, Event::human(Role::HumanSecondary, "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::InvalidRole(_)));

        let err = sessions
            .dispatch(&id, Event::FacilitationRequested)
            .await
            .unwrap_err();
        assert!(matches!(err, TurnError::UnsupportedAction(_)));

        let snapshot = sessions.snapshot(&id).await.unwrap();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.state, TurnState::Idle);
    }

    #[tokio::test]
    async fn test_turn_rejected_while_reply_pending() {
        let gate = Arc::new(Notify::new());
        let llm = Arc::new(MockLlmClient::new("mock").gated(gate.clone()));
        llm.queue_text("Sorry for the wait.");
        let sessions = Arc::new(manager(&llm));
        let id = sessions
            .create_session(Flow::Coaching, None)
            .await
            .unwrap()
            .session_id;

        let first = {
            let sessions = sessions.clone();
            let id = id.clone();
            tokio::spawn(async move {
                sessions
                    .dispatch(&id, Event::human(Role::HumanPrimary, "first"))
                    .await
            })
        };

        // Wait until the first turn is in flight
        for _ in 0..100 {
            if sessions.snapshot(&id).await.unwrap().state == TurnState::AwaitingReply {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let err = sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "second"))
            .await
            .unwrap_err();
        assert_eq!(err, TurnError::Busy);

        gate.notify_one();
        let snapshot = first.await.unwrap().unwrap();
        assert_eq!(snapshot.messages.len(), 3);
        assert_eq!(llm.recorded_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_subscribe_sees_new_messages() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        llm.queue_text("I hear you.");
        let sessions = manager(&llm);
        let id = sessions
            .create_session(Flow::Coaching, None)
            .await
            .unwrap()
            .session_id;

        let (snapshot, mut rx) = sessions.subscribe(&id).await.unwrap();
        assert_eq!(snapshot.messages.len(), 1);

        sessions
            .dispatch(&id, Event::human(Role::HumanPrimary, "hello"))
            .await
            .unwrap();

        let mut messages = 0;
        let mut done = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                SseEvent::Message { .. } => messages += 1,
                SseEvent::ReplyDone => done = true,
                _ => {}
            }
        }
        assert_eq!(messages, 2);
        assert!(done);
    }

    #[tokio::test]
    async fn test_idle_session_is_dropped() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        let sessions = manager(&llm).with_idle_timeout(Duration::from_millis(300));

        let idle = sessions.create_session(Flow::Coaching, None).await.unwrap();
        let active = sessions.create_session(Flow::Facilitation, None).await.unwrap();
        let (_, mut rx) = sessions.subscribe(&idle.session_id).await.unwrap();

        // Each command restarts the quiet period
        for _ in 0..6 {
            tokio::time::sleep(Duration::from_millis(100)).await;
            sessions.snapshot(&active.session_id).await.unwrap();
        }

        assert!(matches!(
            sessions.snapshot(&idle.session_id).await,
            Err(TurnError::SessionNotFound(_))
        ));
        assert!(!sessions.sessions.read().await.contains_key(&idle.session_id));
        assert!(sessions.sessions.read().await.contains_key(&active.session_id));
        // Subscribers see the stream close
        assert!(matches!(
            rx.recv().await,
            Err(tokio::sync::broadcast::error::RecvError::Closed)
        ));

        tokio::time::sleep(Duration::from_millis(600)).await;
        assert!(sessions.sessions.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_pending_reply_keeps_session_alive() {
        let gate = Arc::new(Notify::new());
        let llm = Arc::new(MockLlmClient::new("mock").gated(gate.clone()));
        llm.queue_text("Take your time.");
        let sessions = Arc::new(manager(&llm).with_idle_timeout(Duration::from_millis(50)));

        let created = sessions.create_session(Flow::Coaching, None).await.unwrap();
        let id = created.session_id.clone();
        let turn = tokio::spawn({
            let sessions = sessions.clone();
            async move {
                sessions
                    .dispatch(&id, Event::human(Role::HumanPrimary, "hello"))
                    .await
            }
        });

        tokio::time::sleep(Duration::from_millis(150)).await;
        gate.notify_one();

        let snapshot = turn.await.unwrap().unwrap();
        assert_eq!(snapshot.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let llm = Arc::new(MockLlmClient::new("mock"));
        let sessions = manager(&llm);

        let err = sessions.create_session(Flow::Advisor, None).await.unwrap_err();
        assert!(matches!(err, TurnError::UnsupportedAction(_)));

        let a = sessions.create_session(Flow::Coaching, None).await.unwrap();
        let b = sessions.create_session(Flow::Coaching, None).await.unwrap();
        assert_ne!(a.session_id, b.session_id);

        sessions.end_session(&a.session_id).await.unwrap();
        assert!(matches!(
            sessions.snapshot(&a.session_id).await,
            Err(TurnError::SessionNotFound(_))
        ));
        assert!(matches!(
            sessions.end_session(&a.session_id).await,
            Err(TurnError::SessionNotFound(_))
        ));
        assert!(sessions.snapshot(&b.session_id).await.is_ok());
    }
}
