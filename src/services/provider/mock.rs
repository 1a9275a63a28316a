//! Scripted provider for tests.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FragmentStream, ProviderError, TextProvider, Turn};

/// Replays a fixed script of fragments and records every prompt it receives.
pub struct ScriptedProvider {
    opening: Option<ProviderError>,
    script: Vec<Result<String, ProviderError>>,
    prompts: Mutex<Vec<String>>,
    histories: Mutex<Vec<usize>>,
}

impl ScriptedProvider {
    /// Stream `fragments` in order, then end normally.
    pub fn fragments<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::script(fragments.into_iter().map(|f| Ok(f.into())).collect())
    }

    /// Stream an arbitrary mix of fragments and errors.
    pub fn script(script: Vec<Result<String, ProviderError>>) -> Self {
        Self {
            opening: None,
            script,
            prompts: Mutex::new(Vec::new()),
            histories: Mutex::new(Vec::new()),
        }
    }

    /// Fail the request before any fragment is produced.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            opening: Some(error),
            ..Self::script(Vec::new())
        }
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }

    /// Length of the session history seen on each call.
    pub async fn history_lengths(&self) -> Vec<usize> {
        self.histories.lock().await.clone()
    }
}

#[async_trait]
impl TextProvider for ScriptedProvider {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn stream_reply(
        &self,
        history: &[Turn],
        prompt: &str,
    ) -> Result<FragmentStream, ProviderError> {
        self.prompts.lock().await.push(prompt.to_string());
        self.histories.lock().await.push(history.len());

        if let Some(error) = &self.opening {
            return Err(error.clone());
        }

        Ok(Box::pin(tokio_stream::iter(self.script.clone())))
    }
}
