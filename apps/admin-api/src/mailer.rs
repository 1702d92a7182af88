//! Outbound mail wiring

use email::{EmailProvider, SmtpProvider, TemplateEngine, TemplateMailer};
use std::sync::Arc;
use tracing::info;

use crate::config::Config;

/// SMTP from `SMTP_*` settings in production, a local MailHog otherwise.
pub fn build(config: &Config) -> eyre::Result<Arc<dyn EmailProvider>> {
    let provider = if config.environment.is_production() {
        SmtpProvider::from_env()?
    } else {
        info!("Development mode: sending mail through MailHog on localhost:1025");
        SmtpProvider::mailhog()?
    };

    let templates = TemplateEngine::new()?;
    Ok(Arc::new(TemplateMailer::new(provider, templates)))
}
