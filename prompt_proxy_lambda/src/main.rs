/**
 * This is the main entry point for the `prompt_proxy_lambda` lambda
 * function.
 *
 * It accepts prompts from browser clients and relays them to the Gemini
 * API, injecting the API key held by the deployment.
 */
use std::sync::Arc;

use prompt_proxy_lambda::{AppContext, Config, GeminiClient, router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let context: AppContext<GeminiClient> =
        proxy_app::create_app_context::<_, Config>().await?;

    proxy_app::run_app(router(Arc::new(context))).await
}
