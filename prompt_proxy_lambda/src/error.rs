use axum::{
    Json,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::upstream::UpstreamError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("API key is not configured on the server.")]
    MissingApiKey,
    #[error("Prompt is required in the request body.")]
    MissingPrompt,
    #[error("Method {0} Not Allowed")]
    MethodNotAllowed(Method),
    #[error("An error occurred with the Google API: {body}")]
    Upstream { status: u16, body: String },
    /// The detail is logged, never returned to the caller.
    #[error("An internal server error occurred.")]
    Unexpected(String),
}

impl ProxyError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingApiKey | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::MissingPrompt => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::BAD_GATEWAY),
        }
    }
}

impl From<UpstreamError> for ProxyError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::Status { status, body } => {
                Self::Upstream { status, body }
            }
            UpstreamError::Transport(e) => {
                Self::Unexpected(format!("upstream request failed: {e}"))
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match &self {
            Self::MissingApiKey => {
                tracing::error!("GEMINI_API_KEY is not configured");
            }
            Self::MissingPrompt | Self::MethodNotAllowed(_) => {
                tracing::info!("rejected request: {self}");
            }
            Self::Upstream { status, body } => {
                tracing::error!("Google API error ({status}): {body}");
            }
            Self::Unexpected(detail) => {
                tracing::error!("server error: {detail}");
            }
        }

        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));

        if matches!(self, Self::MethodNotAllowed(_)) {
            return (status, [(header::ALLOW, "POST")], body).into_response();
        }

        (status, body).into_response()
    }
}
