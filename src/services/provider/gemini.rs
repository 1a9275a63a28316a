//! Gemini streaming client.
//!
//! Calls `models/{model}:streamGenerateContent?alt=sse` and turns each SSE
//! payload into a text fragment.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use futures::{StreamExt, stream};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use super::{FragmentStream, ProviderError, Role, TextProvider, Turn};
use crate::sse::SseDecoder;

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub connect_timeout: Duration,
    /// Longest silence allowed between two reads of the response body. A
    /// stream that keeps producing is never cut off.
    pub read_timeout: Duration,
}

pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        if config.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "GEMINI_API_KEY is empty".to_string(),
            ));
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.config.api_base.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl TextProvider for GeminiProvider {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn stream_reply(
        &self,
        history: &[Turn],
        prompt: &str,
    ) -> Result<FragmentStream, ProviderError> {
        let mut contents: Vec<Content> = history.iter().map(Content::from).collect();
        contents.push(Content::user(prompt));
        let request = GenerateContentRequest { contents };

        tracing::debug!(
            model = %self.config.model,
            prompt_len = prompt.len(),
            history_len = history.len(),
            "Starting streaming request to Gemini API"
        );

        let response = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        Ok(fragments(response))
    }
}

fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let detail = format!("Gemini API error {}: {}", status, body.trim());
    if status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::RateLimited(detail)
    } else {
        ProviderError::ApiError(detail)
    }
}

struct StreamState<S> {
    bytes: S,
    decoder: SseDecoder,
    pending: VecDeque<Result<String, ProviderError>>,
    done: bool,
}

fn fragments(response: reqwest::Response) -> FragmentStream {
    let state = StreamState {
        bytes: Box::pin(response.bytes_stream()),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        done: false,
    };

    let stream = stream::unfold(state, |mut st| async move {
        loop {
            if let Some(item) = st.pending.pop_front() {
                if item.is_err() {
                    st.done = true;
                    st.pending.clear();
                }
                return Some((item, st));
            }
            if st.done {
                return None;
            }

            match st.bytes.next().await {
                Some(Ok(chunk)) => {
                    for payload in st.decoder.feed(&chunk) {
                        st.pending.extend(parse_payload(&payload));
                    }
                }
                Some(Err(e)) => {
                    st.done = true;
                    return Some((Err(ProviderError::NetworkError(e.to_string())), st));
                }
                None => {
                    st.done = true;
                    if let Some(payload) = st.decoder.finish() {
                        st.pending.extend(parse_payload(&payload));
                    }
                }
            }
        }
    });

    Box::pin(stream)
}

/// Interpret one SSE payload. `None` means the payload carried no text.
pub fn parse_payload(payload: &str) -> Option<Result<String, ProviderError>> {
    let response: GenerateContentResponse = match serde_json::from_str(payload) {
        Ok(r) => r,
        Err(e) => return Some(Err(ProviderError::MalformedResponse(e.to_string()))),
    };

    if let Some(error) = response.error {
        let message = error.message.unwrap_or_else(|| "unknown error".to_string());
        return Some(Err(match error.code {
            Some(429) => ProviderError::RateLimited(message),
            _ => ProviderError::ApiError(message),
        }));
    }

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Some(Err(ProviderError::ContentFiltered(format!(
            "prompt blocked: {}",
            reason
        ))));
    }

    let candidate = response.candidates.into_iter().next()?;
    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if candidate.finish_reason.as_deref() == Some("SAFETY") {
        return Some(Err(ProviderError::ContentFiltered(
            "response stopped by safety filter".to_string(),
        )));
    }

    if text.is_empty() { None } else { Some(Ok(text)) }
}

// ============================================================================
// Gemini API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: Some(text.to_string()) }],
        }
    }
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        let role = match turn.role {
            Role::User => "user",
            Role::Model => "model",
        };
        Self {
            role: Some(role.to_string()),
            parts: vec![Part { text: Some(turn.text.clone()) }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
}
