// src/state.rs
use std::sync::Arc;

use crate::config::{AppConfig, CorsConfig};
use crate::services::provider::TextProvider;
use crate::services::provider::gemini::GeminiProvider;

pub type SharedState = Arc<AppState>;

/// Provider availability, decided once at startup.
#[derive(Clone)]
pub enum ProviderHandle {
    Configured(Arc<dyn TextProvider>),
    Unconfigured(String),
}

impl ProviderHandle {
    pub fn from_config(config: &AppConfig) -> Self {
        let Some(gemini) = config.gemini.clone() else {
            tracing::error!("GEMINI_API_KEY not found in environment variables");
            return ProviderHandle::Unconfigured("GEMINI_API_KEY not found".to_string());
        };

        match GeminiProvider::new(gemini) {
            Ok(provider) => {
                tracing::info!(model = %provider.model_name(), "Gemini provider configured");
                ProviderHandle::Configured(Arc::new(provider))
            }
            Err(e) => {
                tracing::error!(error = %e, "Error configuring Gemini API");
                ProviderHandle::Unconfigured(e.to_string())
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, ProviderHandle::Configured(_))
    }
}

pub struct AppState {
    pub provider: ProviderHandle,
    pub cors: CorsConfig,
}

impl AppState {
    pub fn new(provider: ProviderHandle, cors: CorsConfig) -> Self {
        Self { provider, cors }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(ProviderHandle::from_config(config), config.cors.clone())
    }
}
