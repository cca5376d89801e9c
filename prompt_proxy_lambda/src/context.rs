use aws_sdk_secretsmanager::Client as SecretsManagerClient;
use redact::Secret;

use crate::{config::Config, upstream::GeminiClient};

/// Shared, read-only state for every request.
///
/// `api_key` is `None` when neither the environment nor Secrets Manager
/// supplied a key; submissions are then rejected without calling upstream.
#[derive(Debug)]
pub struct AppContext<C> {
    pub config: Config,
    pub api_key: Option<Secret<String>>,
    pub client: C,
}

impl<C> AppContext<C> {
    pub const fn with_client(
        config: Config,
        api_key: Option<Secret<String>>,
        client: C,
    ) -> Self {
        Self {
            config,
            api_key,
            client,
        }
    }
}

impl proxy_app::ContextProvider<Config> for AppContext<GeminiClient> {
    async fn new(config: Config, aws_config: aws_config::SdkConfig) -> Self {
        let api_key = resolve_api_key(&config, |secret_arn| async move {
            let secrets_manager = SecretsManagerClient::new(&aws_config);
            fetch_api_key(&secrets_manager, &secret_arn).await
        })
        .await;

        let client = GeminiClient::new(
            reqwest::Client::new(),
            &config.gemini_api_base_url,
            &config.gemini_model,
        );

        Self::with_client(config, api_key, client)
    }
}

/// Pick the API key: `GEMINI_API_KEY` when set, otherwise whatever `fetch`
/// finds under `GEMINI_SECRET_ARN`.
async fn resolve_api_key<F, Fut>(
    config: &Config,
    fetch: F,
) -> Option<Secret<String>>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Option<Secret<String>>>,
{
    if let Some(api_key) = config.api_key() {
        return Some(api_key);
    }

    let Some(secret_arn) = config.gemini_secret_arn.clone() else {
        tracing::error!(
            "no API key configured: GEMINI_API_KEY and GEMINI_SECRET_ARN are both unset"
        );
        return None;
    };

    let api_key = fetch(secret_arn).await;
    if api_key.is_none() {
        tracing::error!(
            "no API key configured: GEMINI_API_KEY is unset and the secret \
             named by GEMINI_SECRET_ARN could not be read or is empty"
        );
    }

    api_key
}

async fn fetch_api_key(
    secrets_manager: &SecretsManagerClient,
    secret_arn: &str,
) -> Option<Secret<String>> {
    match secrets_manager
        .get_secret_value()
        .secret_id(secret_arn)
        .send()
        .await
    {
        Ok(secret) => secret
            .secret_string
            .filter(|value| !value.is_empty())
            .map(Secret::new),
        Err(e) => {
            tracing::error!("failed to get Gemini secret: {:?}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn create_test_config(
        api_key: Option<&str>,
        secret_arn: Option<&str>,
    ) -> Config {
        Config {
            gemini_api_key: api_key.map(|key| Secret::new(key.to_string())),
            gemini_secret_arn: secret_arn.map(str::to_string),
            ..Config::default()
        }
    }

    fn exposed(api_key: Option<Secret<String>>) -> Option<String> {
        api_key.map(|key| key.expose_secret().clone())
    }

    #[tokio::test]
    async fn test_env_key_wins_over_secret_arn() {
        let fetches = AtomicUsize::new(0);
        let config = create_test_config(Some("env-key"), Some("arn:secret"));

        let api_key = resolve_api_key(&config, |_| async {
            fetches.fetch_add(1, Ordering::SeqCst);
            Some(Secret::new("stored-key".to_string()))
        })
        .await;

        assert_eq!(exposed(api_key), Some("env-key".to_string()));
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_secret_arn_used_when_env_key_missing_or_empty() {
        for env_key in [None, Some("")] {
            let config = create_test_config(env_key, Some("arn:secret"));

            let api_key = resolve_api_key(&config, |secret_arn| async move {
                assert_eq!(secret_arn, "arn:secret");
                Some(Secret::new("stored-key".to_string()))
            })
            .await;

            assert_eq!(exposed(api_key), Some("stored-key".to_string()));
        }
    }

    #[tokio::test]
    async fn test_failed_fetch_leaves_key_unset() {
        let config = create_test_config(None, Some("arn:secret"));

        let api_key = resolve_api_key(&config, |_| async { None }).await;

        assert!(api_key.is_none());
    }

    #[tokio::test]
    async fn test_no_source_never_fetches() {
        let fetches = AtomicUsize::new(0);
        let config = create_test_config(None, None);

        let api_key = resolve_api_key(&config, |_| async {
            fetches.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;

        assert!(api_key.is_none());
        assert_eq!(fetches.load(Ordering::SeqCst), 0);
    }
}
