use mongodb::{Client, bson::doc, options::ClientOptions};
use tracing::info;

use super::MongoConfig;
use crate::common::retry_with_backoff;

#[derive(Debug, thiserror::Error)]
pub enum MongoError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("MongoDB did not answer ping: {0}")]
    Unreachable(String),
}

/// Connects to `url` with the default pool settings.
pub async fn connect(url: &str) -> Result<Client, MongoError> {
    connect_from_config(&MongoConfig::new(url)).await
}

/// Builds a client from `config` and returns it once `ping` succeeds.
pub async fn connect_from_config(config: &MongoConfig) -> Result<Client, MongoError> {
    info!(database = %config.database, "Connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(config.connect_timeout);
    options.server_selection_timeout = Some(config.server_selection_timeout);
    options.app_name = config.app_name.clone().or(options.app_name);

    let client = Client::with_options(options)?;
    client
        .database("admin")
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::Unreachable(e.to_string()))?;

    info!(database = %config.database, "Connected to MongoDB");
    Ok(client)
}

/// [`connect_from_config`] retried under `config.retry`.
pub async fn connect_from_config_with_retry(config: &MongoConfig) -> Result<Client, MongoError> {
    retry_with_backoff(|| connect_from_config(config), config.retry).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::RetryPolicy;
    use std::time::Duration;

    #[tokio::test]
    async fn test_malformed_url_is_a_driver_error() {
        let result = connect("not-a-mongo-url").await;
        assert!(matches!(result, Err(MongoError::Mongo(_))));
    }

    #[tokio::test]
    async fn test_malformed_url_fails_without_hanging() {
        let config = MongoConfig::new("not-a-mongo-url").with_retry(
            RetryPolicy::default()
                .with_retries(1)
                .with_base_delay(Duration::from_millis(1))
                .without_jitter(),
        );
        assert!(connect_from_config_with_retry(&config).await.is_err());
    }

    #[tokio::test]
    #[ignore] // Requires a running MongoDB
    async fn test_connect_from_config() {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let config = MongoConfig::with_database(url, "test");
        assert!(connect_from_config(&config).await.is_ok());
    }
}
