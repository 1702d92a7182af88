use std::time::Duration;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_parse};

use crate::common::RetryPolicy;

const DEFAULT_URL: &str = "mongodb://localhost:27017";
const DEFAULT_DATABASE: &str = "admin_api";

/// Where the users collection lives and how the driver reaches it
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// `mongodb://[username:password@]host[:port][/database][?options]`
    pub url: String,
    pub database: String,
    /// Sent in the connection handshake; shows up in server logs and `currentOp`
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout: Duration,
    pub server_selection_timeout: Duration,
    /// Backoff for the startup ping
    pub retry: RetryPolicy,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout: Duration::from_secs(10),
            server_selection_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::new(url)
        }
    }

    pub fn with_app_name(self, app_name: impl Into<String>) -> Self {
        Self {
            app_name: Some(app_name.into()),
            ..self
        }
    }

    pub fn with_retry(self, retry: RetryPolicy) -> Self {
        Self { retry, ..self }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn database(&self) -> &str {
        &self.database
    }
}

#[cfg(feature = "config")]
fn first_of(keys: [&str; 2]) -> Result<String, ConfigError> {
    keys.iter()
        .find_map(|key| std::env::var(key).ok())
        .ok_or_else(|| ConfigError::MissingEnvVar(keys.join(" or ")))
}

/// | variable | default |
/// |---|---|
/// | `MONGODB_URL` / `MONGO_URL` | required |
/// | `MONGODB_DATABASE` / `MONGO_DATABASE` | required |
/// | `MONGODB_APP_NAME` | unset |
/// | `MONGODB_MAX_POOL_SIZE` | 100 |
/// | `MONGODB_MIN_POOL_SIZE` | 5 |
/// | `MONGODB_CONNECT_TIMEOUT_SECS` | 10 |
/// | `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` | 30 |
/// | `MONGODB_CONNECT_RETRIES` | 3 |
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let connect_secs = env_parse(
            "MONGODB_CONNECT_TIMEOUT_SECS",
            defaults.connect_timeout.as_secs(),
        )?;
        let selection_secs = env_parse(
            "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
            defaults.server_selection_timeout.as_secs(),
        )?;
        let retries = env_parse("MONGODB_CONNECT_RETRIES", defaults.retry.retries)?;

        Ok(Self {
            url: first_of(["MONGODB_URL", "MONGO_URL"])?,
            database: first_of(["MONGODB_DATABASE", "MONGO_DATABASE"])?,
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout: Duration::from_secs(connect_secs),
            server_selection_timeout: Duration::from_secs(selection_secs),
            retry: defaults.retry.with_retries(retries),
        })
    }
}
