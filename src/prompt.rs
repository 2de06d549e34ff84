//! Model request construction
//!
//! The model keeps no memory between calls, so every request is rebuilt
//! from the persona preamble and the current transcript alone.

use crate::conversation::{ConversationLog, Message, Role};
use crate::llm::{LlmMessage, LlmRequest};
use crate::persona::{self, Flow, ADVISOR_PREAMBLE, COACHING_PREAMBLE};

/// Build the request for the next assistant turn of a dialogue flow
pub fn dialogue_request(log: &ConversationLog, case_context: Option<&str>) -> LlmRequest {
    match log.flow() {
        Flow::Facilitation => {
            let case = case_context.map_or_else(persona::default_case_context, str::to_string);
            facilitation_request(&persona::facilitation_preamble(&case), log)
        }
        Flow::Coaching | Flow::Advisor => coaching_request(COACHING_PREAMBLE, log),
    }
}

/// Role-alternating history with the preamble injected as the first user turn.
///
/// The newest human utterance is the last entry of the log, so the history
/// ends with it.
pub fn coaching_request(preamble: &str, log: &ConversationLog) -> LlmRequest {
    let messages = std::iter::once(LlmMessage::user(preamble))
        .chain(log.render().iter().map(to_llm_message))
        .collect();

    LlmRequest { messages }
}

fn to_llm_message(msg: &Message) -> LlmMessage {
    match msg.role() {
        Role::Assistant => LlmMessage::assistant(msg.content()),
        Role::HumanPrimary | Role::HumanSecondary => LlmMessage::user(msg.content()),
    }
}

/// A single prompt holding the preamble and the flattened transcript
pub fn facilitation_request(preamble: &str, log: &ConversationLog) -> LlmRequest {
    let speaker = log
        .flow()
        .speaker_label(Role::Assistant)
        .unwrap_or("Assistant");
    LlmRequest::prompt(format!(
        "{preamble}\n\n[Conversation so far]\n{}\n[{speaker}]:",
        log.to_transcript()
    ))
}

/// The single-shot advisor prompt
pub fn advice_request(query: &str) -> LlmRequest {
    LlmRequest::prompt(format!("{ADVISOR_PREAMBLE}\n\n[User's concern]: {query}"))
}
