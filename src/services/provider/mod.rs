//! Text-generation provider seam.
//!
//! The relay only needs one capability from a model provider: open a
//! session and stream the reply to a prompt as text fragments.

pub mod gemini;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Lazy, finite, non-restartable sequence of reply fragments.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, ProviderError>> + Send>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// Stream the reply to `prompt`, given the session's prior turns.
    async fn stream_reply(
        &self,
        history: &[Turn],
        prompt: &str,
    ) -> Result<FragmentStream, ProviderError>;
}

/// Conversational session bound to one provider.
pub struct ChatSession {
    provider: Arc<dyn TextProvider>,
    history: Vec<Turn>,
}

impl ChatSession {
    /// Start a session with no prior turns.
    pub fn start(provider: Arc<dyn TextProvider>) -> Self {
        Self { provider, history: Vec::new() }
    }

    /// Send `prompt` and return its reply stream.
    pub async fn send_streaming(&self, prompt: &str) -> Result<FragmentStream, ProviderError> {
        self.provider.stream_reply(&self.history, prompt).await
    }
}
