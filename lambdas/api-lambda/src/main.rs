use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use filezen_shared::{config::AppConfig, AppState};
use lambda_http::{run, service_fn, tracing, Error, Request};
use std::sync::Arc;

mod http_handler;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing::init_default_subscriber();

    // Initialize AWS clients and configuration once at startup
    let aws_config = aws_config::load_from_env().await;
    let app_config = AppConfig::from_env()?;

    let state = AppState::new(
        DynamoClient::new(&aws_config),
        S3Client::new(&aws_config),
        reqwest::Client::new(),
        app_config,
    );

    run(service_fn(move |event: Request| {
        let state = Arc::clone(&state);
        async move { http_handler::function_handler(event, state).await }
    }))
    .await
}
