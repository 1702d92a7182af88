//! Helpers shared by the store connectors

pub mod retry;

pub use retry::{RetryPolicy, retry_with_backoff};
