//! Relays prompts from browser clients to the Gemini API, holding the API key
//! on the server.
//!
//! Requests are accepted on `/api/gemini`. A `POST` with
//! `{"prompt": ..., "systemInstruction": ...}` is forwarded once to the
//! `generateContent` endpoint and the answer is relayed back, either verbatim
//! or reduced to `{"text": ...}` depending on [`ResponseShape`].
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    http::{HeaderValue, Request, StatusCode, header},
    routing::post,
};
use serde_json::json;
use tower_http::{
    compression::CompressionLayer, set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

mod config;
mod context;
mod error;
mod handlers;
mod payload;
mod shape;
mod upstream;

pub use config::Config;
pub use context::AppContext;
pub use error::ProxyError;
pub use payload::{Content, GenerateContentRequest, Part, PromptRequest};
pub use shape::ResponseShape;
pub use upstream::{GeminiClient, GenerativeClient, UpstreamError};

pub const GENERATE_PATH: &str = "/api/gemini";

/// Build the proxy router around a shared context.
///
/// Every response, including errors and the 404 fallback, carries the
/// permissive CORS headers.
pub fn router<C: GenerativeClient + 'static>(
    context: Arc<AppContext<C>>,
) -> Router {
    // Set up a trace layer
    let trace_layer = TraceLayer::new_for_http().on_request(
        |request: &Request<Body>, _: &tracing::Span| {
            tracing::info!(
                "received request: {method} {uri}",
                method = request.method(),
                uri = request.uri()
            );
        },
    );

    let compression_layer = CompressionLayer::new().gzip(true).deflate(true);

    Router::new()
        .route(
            GENERATE_PATH,
            post(handlers::generate::<C>)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(|| async {
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, "application/json")],
                Json(json!({
                    "message": "not found",
                })),
            )
        })
        .layer(trace_layer)
        .layer(compression_layer)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(context)
}
