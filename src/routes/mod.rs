// src/routes/mod.rs
pub mod chat;

use std::any::Any;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderName, HeaderValue, Method},
    response::Response,
    routing::{get, post},
};
use chat::chat_handler;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AllowList, CorsConfig};
use crate::error::internal_error_response;
use crate::state::SharedState;

pub const HEALTH_BODY: &str = "Backend is running and healthy!";

/// Documents and glossaries travel inline, so allow bodies well past axum's default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn create_router(state: SharedState) -> Router {
    let cors = state.cors.clone();

    let routes = Router::new()
        .route("/", get(|| async { HEALTH_BODY }))
        .route("/health", get(|| async { "OK" }))
        .route("/chat", post(chat_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    with_layers(routes, &cors)
}

/// Wrap `routes` in the panic, trace and CORS layers. CORS is outermost, so
/// preflights and 500s carry its headers too.
pub fn with_layers(routes: Router, cors: &CorsConfig) -> Router {
    routes
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors))
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Handler panicked");
    internal_error_response()
}

/// Build the CORS layer. Wildcards are mirrored from the request when
/// credentials are allowed, since a credentialed response cannot carry `*`.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mirror = config.allow_credentials;

    let origins = match &config.allowed_origins {
        AllowList::Any if mirror => AllowOrigin::mirror_request(),
        AllowList::Any => AllowOrigin::any(),
        AllowList::List(origins) => AllowOrigin::list(parse_all::<HeaderValue>(origins, "origin")),
    };

    let methods = match &config.allowed_methods {
        AllowList::Any if mirror => AllowMethods::mirror_request(),
        AllowList::Any => AllowMethods::any(),
        AllowList::List(methods) => AllowMethods::list(parse_all::<Method>(methods, "method")),
    };

    let headers = match &config.allowed_headers {
        AllowList::Any if mirror => AllowHeaders::mirror_request(),
        AllowList::Any => AllowHeaders::any(),
        AllowList::List(headers) => AllowHeaders::list(parse_all::<HeaderName>(headers, "header")),
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(config.allow_credentials)
}

fn parse_all<T: std::str::FromStr>(values: &[String], kind: &str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| match value.parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!(kind, value = %value, "Ignoring invalid CORS entry");
                None
            }
        })
        .collect()
}
