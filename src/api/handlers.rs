//! HTTP request handlers

use super::assets::{get_index_html, serve_static};
use super::sse::sse_stream;
use super::types::{
    AdviceRequest, CreateSessionRequest, CredentialRequest, CredentialResponse, ErrorResponse,
    FlowInfo, FlowsResponse, ModelsResponse, RoleInfo, SendMessageRequest, SuccessResponse,
};
use super::AppState;
use crate::advice::{request_advice, StructuredAdvice};
use crate::conversation::Role;
use crate::error::TurnError;
use crate::persona::{default_case_context, Flow};
use crate::runtime::{SessionSnapshot, SseEvent};
use crate::state_machine::Event;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Root serves the single-page UI
        .route("/", get(serve_spa))
        .route("/assets/*path", get(serve_static))
        // Flow catalogue
        .route("/api/flows", get(list_flows))
        // Single-shot advisor
        .route("/api/advice", post(advise))
        // Sessions
        .route("/api/sessions/new", post(create_session))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id/stream", get(stream_session))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/facilitate", post(facilitate))
        .route("/api/sessions/:id/end", post(end_session))
        // Model info and credential
        .route("/api/models", get(list_models))
        .route("/api/credential", put(set_credential))
        // Version
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// SPA Handler
// ============================================================

async fn serve_spa() -> impl IntoResponse {
    match get_index_html() {
        Some(content) => Html(content).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Html("<h1>404 - UI not found</h1>".to_string()),
        )
            .into_response(),
    }
}

// ============================================================
// Flows
// ============================================================

async fn list_flows(State(state): State<AppState>) -> Json<FlowsResponse> {
    let flows = Flow::ALL
        .into_iter()
        .map(|flow| FlowInfo {
            id: flow,
            dialogue: flow.is_dialogue(),
            roles: flow
                .roles()
                .iter()
                .map(|&role| RoleInfo {
                    role,
                    label: flow.speaker_label(role).unwrap_or_default().to_string(),
                    human: role.is_human(),
                })
                .collect(),
            default_case_context: (flow == Flow::Facilitation).then(default_case_context),
        })
        .collect();

    Json(FlowsResponse {
        flows,
        credential_configured: state.sessions.llm().has_credential(),
    })
}

// ============================================================
// Advisor
// ============================================================

async fn advise(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdviceRequest>,
) -> Result<Json<StructuredAdvice>, AppError> {
    let advice = request_advice(state.sessions.llm().as_ref(), &req.query).await?;
    Ok(Json(advice))
}

// ============================================================
// Sessions
// ============================================================

async fn create_session(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateSessionRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let flow: Flow = req.flow.parse().map_err(AppError::BadRequest)?;
    let snapshot = state
        .sessions
        .create_session(flow, req.case_context)
        .await?;
    Ok(Json(snapshot))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    Ok(Json(state.sessions.snapshot(&id).await?))
}

async fn stream_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (snapshot, broadcast_rx) = state.sessions.subscribe(&id).await?;
    Ok(sse_stream(SseEvent::Init { snapshot }, broadcast_rx))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<SendMessageRequest>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let role = match req.role.as_deref() {
        Some(role) => role.parse::<Role>()?,
        None => Role::HumanPrimary,
    };
    let snapshot = state
        .sessions
        .dispatch(&id, Event::human(role, req.text))
        .await?;
    Ok(Json(snapshot))
}

async fn facilitate(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = state
        .sessions
        .dispatch(&id, Event::FacilitationRequested)
        .await?;
    Ok(Json(snapshot))
}

async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    state.sessions.end_session(&id).await?;
    Ok(Json(SuccessResponse { success: true }))
}

// ============================================================
// Model Info and Credential
// ============================================================

async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.llm_registry.available_model_info(),
        default: state.llm_registry.default_model_id().to_string(),
        credential_configured: state.llm_registry.has_models(),
    })
}

async fn set_credential(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CredentialRequest>,
) -> Result<Json<CredentialResponse>, AppError> {
    state
        .llm_registry
        .configure_api_key(&req.api_key)
        .map_err(AppError::BadRequest)?;

    Ok(Json(CredentialResponse {
        configured: state.llm_registry.has_models(),
        models: state.llm_registry.available_models(),
    }))
}

// ============================================================
// Version
// ============================================================

async fn get_version() -> &'static str {
    concat!("persona_dialogue ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

/// JSON body extractor whose rejections use the API error shape
#[derive(FromRequest)]
#[from_request(via(Json), rejection(AppError))]
struct ApiJson<T>(T);

enum AppError {
    Turn(TurnError),
    BadRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<TurnError> for AppError {
    fn from(e: TurnError) -> Self {
        AppError::Turn(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Turn(e) => {
                let status = match &e {
                    TurnError::EmptyInput
                    | TurnError::InvalidRole(_)
                    | TurnError::UnsupportedAction(_) => StatusCode::BAD_REQUEST,
                    TurnError::SessionNotFound(_) => StatusCode::NOT_FOUND,
                    TurnError::Busy => StatusCode::CONFLICT,
                    TurnError::MissingCredential => StatusCode::PRECONDITION_FAILED,
                    TurnError::RemoteGeneration(_) | TurnError::MalformedReply(_) => {
                        StatusCode::BAD_GATEWAY
                    }
                };
                let body = ErrorResponse {
                    error: e.to_string(),
                    kind: e.kind().as_str(),
                    hint: e.retry_hint(),
                };
                (status, body)
            }
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: msg,
                    kind: "bad_request",
                    hint: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
