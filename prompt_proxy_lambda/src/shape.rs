use serde::Deserialize;
use serde_json::{Value, json};

/// How a successful upstream response is turned into the body sent back to
/// the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// Relay the upstream JSON as is.
    #[default]
    Passthrough,
    /// Relay only `{"text": ...}` taken from the first candidate's first part.
    Text,
}

impl ResponseShape {
    #[must_use]
    pub fn apply(self, response: Value) -> Value {
        match self {
            Self::Passthrough => response,
            Self::Text => json!({ "text": first_candidate_text(&response) }),
        }
    }
}

fn first_candidate_text(response: &Value) -> &str {
    response
        .pointer("/candidates/0/content/parts/0/text")
        .and_then(Value::as_str)
        .unwrap_or_default()
}
