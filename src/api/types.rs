//! API request and response types

use crate::conversation::Role;
use crate::persona::Flow;
use serde::{Deserialize, Serialize};

/// Request for single-shot advice
#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    pub query: String,
}

/// Request to create a new session
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub flow: String,
    /// Facilitation only: profile of the person being counselled
    #[serde(default)]
    pub case_context: Option<String>,
}

/// Request to send a human turn
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    /// Defaults to the primary human role
    #[serde(default)]
    pub role: Option<String>,
    /// Absent text is treated as empty input
    #[serde(default)]
    pub text: String,
}

/// Request to install an API key
#[derive(Debug, Deserialize)]
pub struct CredentialRequest {
    pub api_key: String,
}

/// One speaker of a flow
#[derive(Debug, Serialize)]
pub struct RoleInfo {
    pub role: Role,
    pub label: String,
    pub human: bool,
}

/// A flow and its roster
#[derive(Debug, Serialize)]
pub struct FlowInfo {
    pub id: Flow,
    pub dialogue: bool,
    pub roles: Vec<RoleInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_case_context: Option<String>,
}

/// Response with the available flows
#[derive(Debug, Serialize)]
pub struct FlowsResponse {
    pub flows: Vec<FlowInfo>,
    pub credential_configured: bool,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Response after installing a credential
#[derive(Debug, Serialize)]
pub struct CredentialResponse {
    pub configured: bool,
    pub models: Vec<String>,
}

/// Model information with metadata
#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub id: String,
    pub provider: String,
    pub description: String,
    pub context_window: usize,
}

/// Response for model list
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelInfo>,
    pub default: String,
    pub credential_configured: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<&'static str>,
}
