//! Pure state transition function
//!
//! Given the same state, context and event, `transition` always returns the
//! same result and performs no I/O. Every rejection happens here, before any
//! effect runs, so a rejected event never touches the log.

use super::{Effect, Event, SessionContext, TurnState};
use crate::conversation::Role;
use crate::error::TurnError;
use crate::persona::Flow;
use serde_json::json;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TurnState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TurnState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Pure transition function
pub fn transition(
    state: &TurnState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TurnError> {
    match (state, event) {
        // ============================================================
        // Human turns
        // ============================================================
        (TurnState::AwaitingReply, Event::HumanMessage { .. } | Event::FacilitationRequested) => {
            Err(TurnError::Busy)
        }

        (TurnState::Idle | TurnState::Error { .. }, Event::HumanMessage { role, text }) => {
            human_turn(context, role, text)
        }

        // ============================================================
        // Explicit AI turn (facilitation only)
        // ============================================================
        (TurnState::Idle | TurnState::Error { .. }, Event::FacilitationRequested) => {
            if context.flow != Flow::Facilitation {
                return Err(TurnError::UnsupportedAction(format!(
                    "the {} flow replies automatically after each message",
                    context.flow
                )));
            }
            if !context.credential_available {
                return Err(TurnError::MissingCredential);
            }
            Ok(TransitionResult::new(TurnState::AwaitingReply)
                .with_effect(Effect::notify_state_change("awaiting_reply", json!({})))
                .with_effect(Effect::RequestLlm))
        }

        // ============================================================
        // Model outcome
        // ============================================================
        (TurnState::AwaitingReply, Event::LlmReply { text, .. }) => {
            if text.trim().is_empty() {
                return Ok(failed_turn(&TurnError::RemoteGeneration(
                    "The model returned an empty reply".to_string(),
                )));
            }
            Ok(TransitionResult::new(TurnState::Idle)
                .with_effect(Effect::append_assistant(text))
                .with_effect(Effect::notify_reply_done()))
        }

        (TurnState::AwaitingReply, Event::LlmFailed { error }) => Ok(failed_turn(&error)),

        (state, event @ (Event::LlmReply { .. } | Event::LlmFailed { .. })) => {
            Err(TurnError::UnsupportedAction(format!(
                "no reply is awaited ({} in state {})",
                event.name(),
                state.as_str()
            )))
        }
    }
}

fn human_turn(
    context: &SessionContext,
    role: Role,
    text: String,
) -> Result<TransitionResult, TurnError> {
    if text.trim().is_empty() {
        return Err(TurnError::EmptyInput);
    }
    if !role.is_human() || !context.flow.allows(role) {
        return Err(TurnError::InvalidRole(role.as_str().to_string()));
    }

    match context.flow {
        // Every human turn obliges exactly one AI turn
        Flow::Coaching => {
            if !context.credential_available {
                return Err(TurnError::MissingCredential);
            }
            Ok(TransitionResult::new(TurnState::AwaitingReply)
                .with_effect(Effect::append_human(role, text))
                .with_effect(Effect::notify_state_change("awaiting_reply", json!({})))
                .with_effect(Effect::RequestLlm))
        }
        // Someone spoke; the facilitator waits to be asked
        Flow::Facilitation => {
            Ok(TransitionResult::new(TurnState::Idle).with_effect(Effect::append_human(role, text)))
        }
        Flow::Advisor => Err(TurnError::UnsupportedAction(
            "the advisor flow has no conversation".to_string(),
        )),
    }
}

/// Leave the log untouched and surface the error
fn failed_turn(error: &TurnError) -> TransitionResult {
    let message = error.to_string();
    TransitionResult::new(TurnState::Error {
        message: message.clone(),
        error_kind: error.kind(),
    })
    .with_effect(Effect::notify_state_change(
        "error",
        json!({ "message": message, "kind": error.kind() }),
    ))
    .with_effect(Effect::ReportFailure {
        error: error.clone(),
    })
}
