//! Shared application state passed to route constructors.

use email::EmailProvider;
use mongodb::{Client, Database};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Application configuration loaded from environment variables
    pub config: crate::config::Config,
    /// MongoDB client (cloneable, shares underlying connection pool)
    pub mongo_client: Client,
    pub db: Database,
    /// Outbound mail, with templates rendered before delivery
    pub mailer: Arc<dyn EmailProvider>,
}
