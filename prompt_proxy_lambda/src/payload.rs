use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

/// Body accepted from the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub prompt: Option<String>,
    pub system_instruction: Option<String>,
}

impl PromptRequest {
    /// Parse the raw request body. An empty body is read as an empty object
    /// so that it fails prompt validation rather than JSON parsing.
    ///
    /// # Errors
    /// [`ProxyError::Unexpected`] if the body is not a JSON object of the
    /// expected shape.
    pub fn from_body(body: &[u8]) -> Result<Self, ProxyError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|e| {
            ProxyError::Unexpected(format!("failed to parse request body: {e}"))
        })
    }

    /// Validate the request and build the upstream payload from it.
    ///
    /// # Errors
    /// [`ProxyError::MissingPrompt`] if `prompt` is absent or empty.
    pub fn into_payload(self) -> Result<GenerateContentRequest, ProxyError> {
        let prompt = self
            .prompt
            .filter(|prompt| !prompt.is_empty())
            .ok_or(ProxyError::MissingPrompt)?;

        Ok(GenerateContentRequest::new(prompt, self.system_instruction))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

impl Content {
    fn from_text(text: String) -> Self {
        Self {
            parts: vec![Part { text }],
        }
    }
}

/// Payload for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
}

impl GenerateContentRequest {
    #[must_use]
    pub fn new(prompt: String, system_instruction: Option<String>) -> Self {
        Self {
            contents: vec![Content::from_text(prompt)],
            system_instruction: system_instruction
                .filter(|instruction| !instruction.is_empty())
                .map(Content::from_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_payload_without_system_instruction() {
        let payload = GenerateContentRequest::new("hi".to_string(), None);

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "contents": [{ "parts": [{ "text": "hi" }] }] })
        );
    }

    #[test]
    fn test_payload_with_system_instruction() {
        let payload = GenerateContentRequest::new(
            "hi".to_string(),
            Some("be brief".to_string()),
        );

        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "contents": [{ "parts": [{ "text": "hi" }] }],
                "systemInstruction": { "parts": [{ "text": "be brief" }] }
            })
        );
    }

    #[test]
    fn test_empty_system_instruction_is_dropped() {
        let payload =
            GenerateContentRequest::new("hi".to_string(), Some(String::new()));

        assert!(payload.system_instruction.is_none());
    }

    #[test]
    fn test_from_body_reads_camel_case() {
        let request = PromptRequest::from_body(
            br#"{"prompt": "hi", "systemInstruction": "be brief"}"#,
        )
        .unwrap();

        assert_eq!(request.prompt.as_deref(), Some("hi"));
        assert_eq!(request.system_instruction.as_deref(), Some("be brief"));
    }

    #[test]
    fn test_empty_body_is_missing_prompt() {
        let result = PromptRequest::from_body(b"  \n").unwrap().into_payload();

        assert!(matches!(result, Err(ProxyError::MissingPrompt)));
    }

    #[test]
    fn test_empty_or_null_prompt_is_missing() {
        for body in [
            &br#"{}"#[..],
            br#"{"prompt": ""}"#,
            br#"{"prompt": null}"#,
            br#"{"systemInstruction": "be brief"}"#,
        ] {
            let result = PromptRequest::from_body(body).unwrap().into_payload();
            assert!(matches!(result, Err(ProxyError::MissingPrompt)));
        }
    }

    #[test]
    fn test_malformed_body_is_unexpected() {
        for body in [&b"{not json"[..], b"[1, 2]", br#"{"prompt": 5}"#] {
            let result = PromptRequest::from_body(body);
            assert!(matches!(result, Err(ProxyError::Unexpected(_))));
        }
    }
}
