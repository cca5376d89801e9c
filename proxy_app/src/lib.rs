use aws_config::{BehaviorVersion, meta::region::RegionProviderChain};
use axum::Router;
use figment::{Figment, providers::Env};
use serde::de::DeserializeOwned;

pub trait ContextProvider<Config> {
    fn new(
        config: Config,
        aws_config: aws_config::SdkConfig,
    ) -> impl Future<Output = Self>;
}

/// Set up the JSON log formatter used by every deployment of the proxy.
///
/// The log level can be overridden with the `RUST_LOG` environment variable.
pub fn init_tracing() {
    // https://docs.aws.amazon.com/lambda/latest/dg/rust-logging.html
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        // this needs to be set to remove duplicated information in the log.
        .with_current_span(false)
        // ANSI color codes show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // CloudWatch adds the ingestion time.
        .without_time()
        .with_target(false)
        .init();
}

/// Extract the configuration from the raw environment variables.
///
/// Variable names are matched case-insensitively against the field names
/// of `Config`, so `GEMINI_MODEL` fills `gemini_model`.
///
/// # Errors
/// If a required variable is missing or a value cannot be parsed into the
/// field's type.
pub fn load_config<Config: DeserializeOwned>() -> Result<Config, figment::Error>
{
    Figment::new().merge(Env::raw()).extract()
}

/// Initialize logging and build the application context.
///
/// The configuration is extracted using figment and the AWS configuration is
/// loaded using the default provider chain before both are handed to the
/// context's [`ContextProvider::new`].
///
/// # Errors
/// If the configuration cannot be extracted from the environment variables.
pub async fn create_app_context<A, Config>() -> Result<A, figment::Error>
where
    A: ContextProvider<Config>,
    Config: DeserializeOwned,
{
    init_tracing();

    let config: Config = load_config()?;

    let region_provider =
        RegionProviderChain::default_provider().or_else("us-east-1");
    let aws_config = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .load()
        .await;

    Ok(A::new(config, aws_config).await)
}

/// Runs an Axum router in either local development mode or Lambda runtime mode.
///
/// In debug builds the router is served on `127.0.0.1:3030` using a standard
/// Axum server. In release builds it is wrapped with the Lambda runtime
/// adapter and executed as a Lambda function.
///
/// # Errors
///
/// Returns an error if the local server fails to bind to the port (debug
/// mode) or the Lambda runtime fails (release mode).
pub async fn run_app(app: Router) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(debug_assertions)]
    {
        let addr = std::net::SocketAddr::from(([127, 0, 0, 1], 3030));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!(
            "Starting local development server on http://127.0.0.1:3030"
        );
        axum::serve(listener, app).await?;
    }

    #[cfg(not(debug_assertions))]
    {
        use lambda_http::tower;

        let app = tower::ServiceBuilder::new()
            .layer(axum_aws_lambda::LambdaLayer::default().trim_stage())
            .service(app);

        lambda_http::run(app)
            .await
            .map_err(|e| e as Box<dyn std::error::Error>)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct TestConfig {
        upstream_model: String,
        optional_value: Option<String>,
    }

    #[test]
    fn test_load_config_reads_raw_env() {
        Jail::expect_with(|jail| {
            jail.set_env("UPSTREAM_MODEL", "some-model");

            let config: TestConfig = load_config()?;

            assert_eq!(config.upstream_model, "some-model");
            assert!(config.optional_value.is_none());
            Ok(())
        });
    }

    #[test]
    fn test_load_config_missing_required_value() {
        Jail::expect_with(|_jail| {
            let result = load_config::<TestConfig>();

            assert!(result.is_err());
            Ok(())
        });
    }
}
