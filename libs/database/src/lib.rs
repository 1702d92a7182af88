//! Connection management for the admin service's document store.
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connector, retry and health probes
//! - `config` - `core_config::FromEnv` support for [`mongodb::MongoConfig`]
//!
//! ```ignore
//! use database::mongodb::{self, MongoConfig};
//!
//! let config = MongoConfig::with_database("mongodb://localhost:27017", "admin");
//! let client = mongodb::connect_from_config_with_retry(&config).await?;
//! let db = client.database(config.database());
//! ```

pub mod common;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use common::{RetryPolicy, retry_with_backoff};
