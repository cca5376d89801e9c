use redact::Secret;
use serde::{Deserialize, Deserializer};

use crate::shape::ResponseShape;

const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-05-20";
const DEFAULT_API_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta";

/// Environment driven configuration for the proxy.
///
/// `gemini_api_key` takes precedence over `gemini_secret_arn`; the ARN is
/// only resolved through Secrets Manager when no key is set directly.
#[derive(Debug, Deserialize, Clone)]
#[allow(clippy::struct_field_names)]
pub struct Config {
    #[serde(default, deserialize_with = "deserialize_optional_secret")]
    pub gemini_api_key: Option<Secret<String>>,

    pub gemini_secret_arn: Option<String>,

    #[serde(
        default = "default_model",
        deserialize_with = "deserialize_lenient_string"
    )]
    pub gemini_model: String,

    #[serde(default = "default_api_base_url")]
    pub gemini_api_base_url: String,

    #[serde(default)]
    pub response_shape: ResponseShape,
}

/// Environment values that look like numbers are handed over as numbers;
/// the string fields here take them back as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum LenientString {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl From<LenientString> for String {
    fn from(value: LenientString) -> Self {
        match value {
            LenientString::Text(text) => text,
            LenientString::Unsigned(number) => number.to_string(),
            LenientString::Signed(number) => number.to_string(),
            LenientString::Float(number) => number.to_string(),
        }
    }
}

fn deserialize_lenient_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    LenientString::deserialize(deserializer).map(String::from)
}

fn deserialize_optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Secret<String>>, D::Error> {
    Ok(Option::<LenientString>::deserialize(deserializer)?
        .map(|value| Secret::new(value.into())))
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_secret_arn: None,
            gemini_model: default_model(),
            gemini_api_base_url: default_api_base_url(),
            response_shape: ResponseShape::default(),
        }
    }
}

impl Config {
    /// The configured key, treating an empty value as unset.
    #[must_use]
    pub fn api_key(&self) -> Option<Secret<String>> {
        self.gemini_api_key
            .as_ref()
            .filter(|key| !key.expose_secret().is_empty())
            .cloned()
    }
}
