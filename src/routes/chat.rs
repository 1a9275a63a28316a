use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{StatusCode, header},
    response::Response,
};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    error::AppError,
    message::{ChatRequest, Language},
    services::{
        prompt::build_prompt,
        provider::{ChatSession, ProviderError},
    },
    sse,
    state::{ProviderHandle, SharedState},
};

/// Frames queued between the provider task and the response body.
const FRAME_BUFFER: usize = 16;

pub async fn chat_handler(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let request = ChatRequest::from_body(&body);
    let prompt = build_prompt(&request);

    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "relay",
        %request_id,
        language = request.language.code(),
        prompt_len = prompt.len()
    );

    let (tx, rx) = mpsc::channel(FRAME_BUFFER);
    tokio::spawn(
        relay(state.provider.clone(), request.language, prompt, tx).instrument(span),
    );

    let frames = ReceiverStream::new(rx).map(Ok::<String, Infallible>);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, sse::CONTENT_TYPE)
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from_stream(frames))
        .map_err(|e| AppError::Internal(e.to_string()))
}

/// Drive one provider stream, pushing each frame as soon as it arrives.
async fn relay(
    provider: ProviderHandle,
    language: Language,
    prompt: String,
    tx: mpsc::Sender<String>,
) {
    let provider = match provider {
        ProviderHandle::Configured(provider) => provider,
        ProviderHandle::Unconfigured(reason) => {
            tracing::error!(%reason, "Chat request rejected: model is not configured");
            let _ = tx.send(sse::error_frame(unconfigured_message(language))).await;
            return;
        }
    };

    let session = ChatSession::start(provider);
    let mut fragments = match session.send_streaming(&prompt).await {
        Ok(stream) => stream,
        Err(e) => {
            send_provider_error(&tx, language, &e).await;
            return;
        }
    };

    let mut sent = 0usize;
    while let Some(item) = fragments.next().await {
        match item {
            Ok(text) if text.is_empty() => {}
            Ok(text) => {
                if tx.send(sse::data_frame(&text)).await.is_err() {
                    tracing::debug!(sent, "Client disconnected, abandoning stream");
                    return;
                }
                sent += 1;
            }
            Err(e) => {
                send_provider_error(&tx, language, &e).await;
                return;
            }
        }
    }

    tracing::debug!(sent, "Stream finished");
}

async fn send_provider_error(tx: &mpsc::Sender<String>, language: Language, error: &ProviderError) {
    tracing::warn!(error = %error, "Error during generation");
    let _ = tx.send(sse::error_frame(&provider_error_message(language, error))).await;
}

fn unconfigured_message(language: Language) -> &'static str {
    match language {
        Language::Vi => "Lỗi máy chủ: Model AI chưa được cấu hình.",
        Language::En => "Server error: the AI model is not configured.",
    }
}

fn provider_error_message(language: Language, error: &ProviderError) -> String {
    match language {
        Language::Vi => format!("Xin lỗi, có lỗi xảy ra từ AI: {}", error),
        Language::En => format!("Sorry, the AI returned an error: {}", error),
    }
}
