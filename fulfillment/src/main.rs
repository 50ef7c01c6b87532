//! Fulfillment Lambda - normalizes inbound channel events.
//!
//! Receives raw Lex v1/v2 or Alexa events, resolves QnABot settings from
//! Parameter Store, and produces the canonical request/response pair the
//! answer-selection stages consume.

mod middleware;

use std::sync::Arc;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Application state
pub(crate) struct AppState {
    pub ssm_client: aws_sdk_ssm::Client,
    pub comprehend_client: aws_sdk_comprehend::Client,
    pub config: Config,
}

impl AppState {
    async fn new() -> Result<Self, Error> {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        Ok(Self {
            ssm_client: aws_sdk_ssm::Client::new(&aws_config),
            comprehend_client: aws_sdk_comprehend::Client::new(&aws_config),
            config: Config::from_env()?,
        })
    }
}

async fn handler(state: Arc<AppState>, event: LambdaEvent<Value>) -> Result<Value, Error> {
    let (payload, _context) = event.into_parts();

    let (req, res) = middleware::parse::parse(&state, payload).await?;
    info!(
        "Normalized request: client type {}, intent '{}'",
        req.client_type, req.intent_name
    );

    Ok(serde_json::json!({ "req": req, "res": res }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let state = Arc::new(AppState::new().await?);

    lambda_runtime::run(service_fn(move |event| {
        let state = Arc::clone(&state);
        async move { handler(state, event).await }
    }))
    .await
}
