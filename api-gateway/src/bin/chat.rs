//! Chat Lambda - Handles /v1/chat endpoint.
//!
//! Accepts `{ "text": ... }` or `{ "userMessage": ... }` and answers with a
//! structured wellbeing reply, or `{ "error": ... }` on failure.

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use shared::http::{error_response, json_response};
use shared::{parse_body, resolve_api_key, CompanionPipeline, Config};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Application state shared across requests.
struct AppState {
    pipeline: CompanionPipeline,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let mut config = Config::from_env();

        // A missing key is reported per request, not as a cold-start failure.
        if config.api_key.is_none() {
            if let Some(secret_arn) = config.api_key_secret_arn.clone() {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                let secrets_client = aws_sdk_secretsmanager::Client::new(&aws_config);

                match resolve_api_key(&secrets_client, &secret_arn).await {
                    Ok(key) => config.api_key = Some(key),
                    Err(e) => {
                        error!("Failed to resolve API key secret: {}", e);
                        config.record_api_key_error(&e);
                    }
                }
            } else {
                warn!("GEMINI_API_KEY not set; chat requests will fail");
            }
        }

        info!(
            model = %config.model,
            development = config.development,
            "Chat function initialized"
        );

        Ok(Self {
            pipeline: CompanionPipeline::new(config, reqwest::Client::new()),
        })
    }
}

async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let body = parse_body!(event.body());

    match state.pipeline.respond(&body).await {
        Ok(reply) => json_response(200, &reply),
        Err(e) => {
            let status = e.status_code();
            if status >= 500 {
                error!(status, "Chat request failed: {}", e);
            } else {
                info!(status, "Chat request rejected: {}", e);
            }
            error_response(status, e.public_message(state.pipeline.config().development))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
