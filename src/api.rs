//! HTTP API for the persona dialogue server

mod assets;
mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
pub use types::ModelInfo;

use crate::llm::ModelRegistry;
use crate::runtime::{RegistryLlmClient, SessionManager};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub llm_registry: Arc<ModelRegistry>,
}

impl AppState {
    pub fn new(llm_registry: Arc<ModelRegistry>, idle_timeout: Duration) -> Self {
        let llm = RegistryLlmClient::new(
            llm_registry.clone(),
            llm_registry.default_model_id().to_string(),
        );
        let sessions = SessionManager::new(Arc::new(llm)).with_idle_timeout(idle_timeout);
        Self {
            sessions: Arc::new(sessions),
            llm_registry,
        }
    }

    /// State whose sessions talk to `llm` instead of the registry
    #[cfg(test)]
    pub fn with_client(
        llm: Arc<dyn crate::runtime::LlmClient>,
        llm_registry: Arc<ModelRegistry>,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(llm)),
            llm_registry,
        }
    }
}
