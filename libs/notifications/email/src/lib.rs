//! Outbound mail for account workflows
//!
//! ## Components
//!
//! - **Models**: [`Email`], the message handed to a provider
//! - **Providers**: [`SmtpProvider`] (lettre) and [`MockSmtpProvider`] for tests
//! - **Templates**: Handlebars-based [`TemplateEngine`] with the built-in
//!   `account_activation` template
//! - **Mailer**: [`TemplateMailer`], a provider decorator that renders
//!   template-backed messages before delegating
//!
//! ```ignore
//! use email::{Email, EmailProvider, SmtpProvider, TemplateEngine, TemplateMailer};
//!
//! let mailer = TemplateMailer::new(SmtpProvider::from_env()?, TemplateEngine::new()?);
//! let email = Email::new("ann@example.com", "Activate your account")
//!     .with_template(email::ACCOUNT_ACTIVATION, serde_json::json!({ "name": "Ann" }));
//! mailer.send(&email).await?;
//! ```

pub mod mailer;
pub mod models;
pub mod provider;
pub mod templates;

pub use mailer::TemplateMailer;
pub use models::Email;
pub use provider::{EmailProvider, MockSmtpProvider, SendResult, SmtpConfig, SmtpProvider};
pub use templates::{EmailTemplate, RenderedTemplate, TemplateEngine, ACCOUNT_ACTIVATION};
