pub mod auth;
pub mod categorizer;
pub mod config;
pub mod files;
pub mod guard;
pub mod metadata;
pub mod s3;
pub mod session;
pub mod types;
pub mod users;

use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;
use std::sync::Arc;

use crate::config::AppConfig;

/// Shared application state, built once at startup.
pub struct AppState {
    pub dynamo_client: DynamoClient,
    pub s3_client: S3Client,
    pub http_client: reqwest::Client,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(
        dynamo_client: DynamoClient,
        s3_client: S3Client,
        http_client: reqwest::Client,
        config: AppConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            dynamo_client,
            s3_client,
            http_client,
            config,
        })
    }
}
