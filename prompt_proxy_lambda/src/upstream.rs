use serde_json::Value;
use thiserror::Error;

use crate::payload::GenerateContentRequest;

/// Failure of the single outbound call.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status.
    #[error("upstream responded with {status}: {body}")]
    Status { status: u16, body: String },
    /// The request could not be sent or the response could not be read.
    #[error("upstream request failed: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        // the request URL carries the API key as a query parameter
        Self::Transport(err.without_url())
    }
}

/// A generative-language backend able to answer one `generateContent`
/// request.
pub trait GenerativeClient: Send + Sync {
    fn generate_content(
        &self,
        api_key: &str,
        payload: &GenerateContentRequest,
    ) -> impl Future<Output = Result<Value, UpstreamError>> + Send;
}

/// HTTP client for the Gemini REST API.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, model: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl GenerativeClient for GeminiClient {
    async fn generate_content(
        &self,
        api_key: &str,
        payload: &GenerateContentRequest,
    ) -> Result<Value, UpstreamError> {
        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
