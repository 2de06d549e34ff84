//! Model registry for managing available LLM providers

use super::{all_models, LlmService, LoggingService, ModelDef, Provider};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Model used when `DEFAULT_MODEL` is not set
pub const FALLBACK_DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Configuration for LLM providers
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub gemini_api_key: Option<String>,
    /// Gateway URL that authenticates on our behalf
    pub gateway: Option<String>,
    /// Default model ID
    pub default_model: Option<String>,
}

impl LlmConfig {
    pub fn from_env() -> Self {
        let gemini_api_key = Provider::Gemini
            .api_key_env_vars()
            .iter()
            .find_map(|var| std::env::var(var).ok())
            .filter(|key| !key.trim().is_empty());

        Self {
            gemini_api_key,
            gateway: std::env::var("LLM_GATEWAY").ok(),
            default_model: std::env::var("DEFAULT_MODEL").ok(),
        }
    }
}

/// Registry of available LLM models.
///
/// Services are rebuilt whenever a credential is installed at runtime, so
/// the map sits behind a lock. Critical sections never await.
pub struct ModelRegistry {
    config: RwLock<LlmConfig>,
    services: RwLock<HashMap<String, Arc<dyn LlmService>>>,
    default_model: String,
}

impl ModelRegistry {
    pub fn new(config: &LlmConfig) -> Self {
        let services = Self::build_services(config);

        let default_model = config
            .default_model
            .clone()
            .unwrap_or_else(|| FALLBACK_DEFAULT_MODEL.to_string());

        Self {
            config: RwLock::new(config.clone()),
            services: RwLock::new(services),
            default_model,
        }
    }

    fn build_services(config: &LlmConfig) -> HashMap<String, Arc<dyn LlmService>> {
        all_models()
            .iter()
            .filter_map(|def| {
                Self::try_create_model(def, config).map(|service| (def.id.to_string(), service))
            })
            .collect()
    }

    /// Try to create a model service, validating prerequisites
    fn try_create_model(model_def: &ModelDef, config: &LlmConfig) -> Option<Arc<dyn LlmService>> {
        // In gateway mode, use "implicit" as the API key
        let api_key = if config.gateway.is_some() {
            "implicit".to_string()
        } else {
            match model_def.provider {
                Provider::Gemini => config.gemini_api_key.clone()?,
            }
        };

        match (model_def.factory)(&api_key, config.gateway.as_deref()) {
            Ok(service) => Some(Arc::new(LoggingService::new(service))),
            Err(e) => {
                tracing::debug!(model = model_def.id, error = %e, "Model unavailable");
                None
            }
        }
    }

    /// Install an API key and rebuild every service that depends on it
    pub fn configure_api_key(&self, api_key: &str) -> Result<(), String> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err("API key must not be empty".to_string());
        }

        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.gemini_api_key = Some(api_key.to_string());
        let services = Self::build_services(&config);
        drop(config);

        let count = services.len();
        *self.services.write().unwrap_or_else(PoisonError::into_inner) = services;
        tracing::info!(models = count, "API key installed, LLM registry rebuilt");
        Ok(())
    }

    /// Get a model by ID
    pub fn get(&self, model_id: &str) -> Option<Arc<dyn LlmService>> {
        self.services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(model_id)
            .cloned()
    }

    /// Get the default model, falling back to any configured model
    pub fn default_service(&self) -> Option<Arc<dyn LlmService>> {
        self.get(&self.default_model).or_else(|| {
            let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
            let first = services.keys().min().cloned();
            first.and_then(|id| services.get(&id).cloned())
        })
    }

    /// Get the default model ID
    pub fn default_model_id(&self) -> &str {
        &self.default_model
    }

    /// List all available model IDs
    pub fn available_models(&self) -> Vec<String> {
        let mut models: Vec<_> = self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        models.sort();
        models
    }

    /// Get detailed information about available models
    pub fn available_model_info(&self) -> Vec<crate::api::ModelInfo> {
        let services = self.services.read().unwrap_or_else(PoisonError::into_inner);
        all_models()
            .iter()
            .filter(|def| services.contains_key(def.id))
            .map(|def| crate::api::ModelInfo {
                id: def.id.to_string(),
                provider: def.provider.display_name().to_string(),
                description: def.description.to_string(),
                context_window: def.context_window,
            })
            .collect()
    }

    /// Whether a model call can be attempted at all
    pub fn has_models(&self) -> bool {
        !self
            .services
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }
}
