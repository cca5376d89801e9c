use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{Method, StatusCode},
};
use serde_json::Value;
use tracing::instrument;

use crate::{
    context::AppContext, error::ProxyError, payload::PromptRequest,
    upstream::GenerativeClient,
};

/// Answer a CORS preflight. The CORS headers are added by the router.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed(method: Method) -> ProxyError {
    ProxyError::MethodNotAllowed(method)
}

/// Relay one prompt to the upstream API.
///
/// The key is checked before the body is looked at so a misconfigured
/// deployment never reaches upstream, whatever the caller sent. A body that
/// could not be read at all (e.g. over the size limit) is a server error.
#[instrument(skip_all)]
pub async fn generate<C: GenerativeClient>(
    State(context): State<Arc<AppContext<C>>>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ProxyError> {
    let api_key = context
        .api_key
        .as_ref()
        .ok_or(ProxyError::MissingApiKey)?;

    let body = body.map_err(|e| {
        ProxyError::Unexpected(format!("failed to read request body: {e}"))
    })?;

    let payload = PromptRequest::from_body(&body)?.into_payload()?;

    let response = context
        .client
        .generate_content(api_key.expose_secret(), &payload)
        .await?;

    Ok(Json(context.config.response_shape.apply(response)))
}
