//! Handlebars templates for transactional mail
//!
//! Subjects and plain-text bodies render without HTML escaping; HTML bodies
//! use the Handlebars default escaping. Both registries run in strict mode so
//! a missing variable fails the render instead of producing a blank.

use eyre::{eyre, Result};
use handlebars::Handlebars;
use serde_json::Value;
use std::collections::HashMap;

/// Name of the built-in activation template
///
/// Context: `name`, `activationCode`, `expiresInMinutes`, `appName`.
pub const ACCOUNT_ACTIVATION: &str = "account_activation";

#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

#[derive(Clone, Debug)]
pub struct EmailTemplate {
    pub name: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
}

pub struct TemplateEngine {
    text: Handlebars<'static>,
    html: Handlebars<'static>,
    templates: HashMap<String, EmailTemplate>,
}

impl TemplateEngine {
    /// Engine with the built-in templates registered
    pub fn new() -> Result<Self> {
        let mut engine = Self::empty();
        engine.register_defaults()?;
        Ok(engine)
    }

    pub fn empty() -> Self {
        let mut text = Handlebars::new();
        text.set_strict_mode(true);
        text.register_escape_fn(handlebars::no_escape);

        let mut html = Handlebars::new();
        html.set_strict_mode(true);

        Self {
            text,
            html,
            templates: HashMap::new(),
        }
    }

    pub fn register(&mut self, template: EmailTemplate) -> Result<()> {
        self.text
            .register_template_string(&format!("{}_subject", template.name), &template.subject)
            .map_err(|e| eyre!("Failed to register subject template: {}", e))?;

        if let Some(text) = &template.body_text {
            self.text
                .register_template_string(&format!("{}_text", template.name), text)
                .map_err(|e| eyre!("Failed to register text template: {}", e))?;
        }

        if let Some(html) = &template.body_html {
            self.html
                .register_template_string(&format!("{}_html", template.name), html)
                .map_err(|e| eyre!("Failed to register HTML template: {}", e))?;
        }

        self.templates.insert(template.name.clone(), template);
        Ok(())
    }

    pub fn render(&self, name: &str, data: &Value) -> Result<RenderedTemplate> {
        let template = self
            .templates
            .get(name)
            .ok_or_else(|| eyre!("Template not found: {}", name))?;

        let subject = self
            .text
            .render(&format!("{}_subject", name), data)
            .map_err(|e| eyre!("Failed to render subject: {}", e))?;

        let body_text = template
            .body_text
            .as_ref()
            .map(|_| {
                self.text
                    .render(&format!("{}_text", name), data)
                    .map_err(|e| eyre!("Failed to render text: {}", e))
            })
            .transpose()?;

        let body_html = template
            .body_html
            .as_ref()
            .map(|_| {
                self.html
                    .render(&format!("{}_html", name), data)
                    .map_err(|e| eyre!("Failed to render HTML: {}", e))
            })
            .transpose()?;

        Ok(RenderedTemplate {
            subject,
            body_text,
            body_html,
        })
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn register_defaults(&mut self) -> Result<()> {
        self.register(EmailTemplate {
            name: ACCOUNT_ACTIVATION.to_string(),
            subject: "Activate your {{appName}} account".to_string(),
            body_text: Some(
                r#"Hello {{name}},

Thanks for signing up for {{appName}}.

Your activation code is:

    {{activationCode}}

The code expires in {{expiresInMinutes}} minutes.

If you didn't create an account, you can safely ignore this email.

The {{appName}} Team"#
                    .to_string(),
            ),
            body_html: Some(
                r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <h1 style="color: #2563eb;">Activate your account</h1>
    <p>Hello {{name}},</p>
    <p>Thanks for signing up for <strong>{{appName}}</strong>. Your activation code is:</p>
    <p style="text-align: center; margin: 30px 0;">
        <code style="font-size: 18px; background: #f3f4f6; padding: 12px 24px; border-radius: 6px;">{{activationCode}}</code>
    </p>
    <p style="color: #666; font-size: 14px;">The code expires in {{expiresInMinutes}} minutes.</p>
    <p style="color: #666; font-size: 14px;">If you didn't create an account, you can safely ignore this email.</p>
    <p>The {{appName}} Team</p>
</body>
</html>"#
                    .to_string(),
            ),
        })
    }
}
