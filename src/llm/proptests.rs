//! Property-based tests for the Gemini translation layer
//!
//! These tests verify that the translation between our internal types
//! and the Gemini wire format preserves key invariants:
//! - Message count, order and text survive translation
//! - Roles map onto Gemini's `user` / `model`
//! - Responses without candidates or text are rejected
//! - Text parts are concatenated in order

use super::gemini::{
    GeminiCandidate, GeminiContent, GeminiPart, GeminiResponse, GeminiService,
    GeminiUsageMetadata,
};
use super::types::{LlmMessage, LlmRequest, MessageRole};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_message() -> impl Strategy<Value = LlmMessage> {
    (any::<bool>(), "[a-zA-Z0-9 _.!?,\n]{0,100}").prop_map(|(is_user, text)| {
        if is_user {
            LlmMessage::user(text)
        } else {
            LlmMessage::assistant(text)
        }
    })
}

fn arb_request() -> impl Strategy<Value = LlmRequest> {
    proptest::collection::vec(arb_message(), 1..12).prop_map(|messages| LlmRequest { messages })
}

fn make_response(parts: Vec<String>, finish_reason: Option<String>) -> GeminiResponse {
    GeminiResponse {
        candidates: vec![GeminiCandidate {
            content: Some(GeminiContent {
                role: Some("model".to_string()),
                parts: parts.into_iter().map(|text| GeminiPart { text }).collect(),
            }),
            finish_reason,
        }],
        usage_metadata: Some(GeminiUsageMetadata {
            prompt_token_count: 10,
            candidates_token_count: 5,
        }),
        prompt_feedback: None,
    }
}

// ============================================================================
// Request translation
// ============================================================================

proptest! {
    /// Every message becomes exactly one content entry, in order, text intact
    #[test]
    fn prop_translate_preserves_messages(request in arb_request()) {
        let wire = GeminiService::translate_request(&request);
        prop_assert_eq!(wire.contents.len(), request.messages.len());

        for (content, msg) in wire.contents.iter().zip(&request.messages) {
            let expected_role = match msg.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            };
            prop_assert_eq!(content.role.as_deref(), Some(expected_role));
            prop_assert_eq!(content.parts.len(), 1);
            prop_assert_eq!(&content.parts[0].text, &msg.text);
        }
    }

    /// The wire body carries only the contents
    #[test]
    fn prop_translate_sends_contents_only(request in arb_request()) {
        let wire = serde_json::to_value(GeminiService::translate_request(&request)).unwrap();
        let keys: Vec<_> = wire.as_object().unwrap().keys().cloned().collect();
        prop_assert_eq!(keys, vec!["contents".to_string()]);
    }
}

// ============================================================================
// Response normalization
// ============================================================================

proptest! {
    /// Non-empty parts are concatenated in order
    #[test]
    fn prop_normalize_concatenates_parts(
        parts in proptest::collection::vec("[a-zA-Z0-9 ]{1,30}", 1..5)
    ) {
        let expected = parts.concat();
        let resp = make_response(parts, Some("STOP".to_string()));
        let normalized = GeminiService::normalize_response(resp);
        prop_assert!(normalized.is_ok());
        let normalized = normalized.unwrap();
        prop_assert_eq!(normalized.text(), expected);
    }

    /// A candidate without any text is an error, whatever the finish reason
    #[test]
    fn prop_normalize_rejects_textless_candidate(
        empty_parts in 0usize..4,
        finish_reason in proptest::option::of("[A-Z_]{3,12}")
    ) {
        let resp = make_response(vec![String::new(); empty_parts], finish_reason);
        prop_assert!(GeminiService::normalize_response(resp).is_err());
    }

    /// No candidates at all is an error
    #[test]
    fn prop_normalize_rejects_no_candidates(
        block_reason in proptest::option::of("[A-Z_]{3,12}")
    ) {
        let body = match &block_reason {
            Some(reason) => format!(r#"{{"promptFeedback": {{"blockReason": "{reason}"}}}}"#),
            None => "{}".to_string(),
        };
        let resp: GeminiResponse = serde_json::from_str(&body).unwrap();
        prop_assert!(GeminiService::normalize_response(resp).is_err());
    }
}
