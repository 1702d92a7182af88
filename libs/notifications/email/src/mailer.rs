//! Template-rendering provider decorator

use crate::models::Email;
use crate::provider::{EmailProvider, SendResult};
use crate::templates::TemplateEngine;
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use std::sync::Arc;
use tracing::debug;

/// Renders `email.template` into subject and bodies, then hands the message
/// to the wrapped provider. Messages without a template pass through as-is.
pub struct TemplateMailer<P: EmailProvider> {
    provider: P,
    templates: Arc<TemplateEngine>,
}

impl<P: EmailProvider> TemplateMailer<P> {
    pub fn new(provider: P, templates: TemplateEngine) -> Self {
        Self {
            provider,
            templates: Arc::new(templates),
        }
    }

    fn render(&self, email: &Email) -> Result<Email> {
        let Some(name) = &email.template else {
            return Ok(email.clone());
        };

        let rendered = self
            .templates
            .render(name, &email.template_data)
            .wrap_err_with(|| format!("Failed to render template '{}'", name))?;

        debug!(email_id = %email.id, template = %name, "Rendered email template");

        let mut out = email.clone();
        out.subject = rendered.subject;
        out.body_text = rendered.body_text;
        out.body_html = rendered.body_html;
        Ok(out)
    }
}

#[async_trait]
impl<P: EmailProvider> EmailProvider for TemplateMailer<P> {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.render(email)?;
        if !message.has_body() {
            return Err(eyre::eyre!("Email must have either text or HTML body"));
        }
        self.provider.send(&message).await
    }

    async fn health_check(&self) -> Result<()> {
        self.provider.health_check().await
    }

    fn name(&self) -> &'static str {
        self.provider.name()
    }
}
