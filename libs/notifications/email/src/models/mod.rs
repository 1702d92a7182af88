use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One outbound message, addressed to a single recipient
///
/// Either a body is set directly or `template` names a template that
/// [`crate::TemplateMailer`] renders into the subject and bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Email {
    pub id: String,
    pub to: String,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    /// Overrides the provider's configured sender
    pub from: Option<String>,
    pub template: Option<String>,
    #[serde(default)]
    pub template_data: Value,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            to: to.into(),
            subject: subject.into(),
            body_text: None,
            body_html: None,
            from: None,
            template: None,
            template_data: Value::Null,
        }
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        Self {
            body_text: Some(text.into()),
            ..self
        }
    }

    pub fn with_html(self, html: impl Into<String>) -> Self {
        Self {
            body_html: Some(html.into()),
            ..self
        }
    }

    pub fn with_from(self, from: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            ..self
        }
    }

    pub fn with_template(self, name: impl Into<String>, data: Value) -> Self {
        Self {
            template: Some(name.into()),
            template_data: data,
            ..self
        }
    }

    pub fn has_body(&self) -> bool {
        self.body_text.is_some() || self.body_html.is_some()
    }
}
