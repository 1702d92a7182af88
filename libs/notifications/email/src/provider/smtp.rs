//! SMTP email provider using lettre

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    pub from_name: String,
    pub use_tls: bool,
}

impl SmtpConfig {
    /// Reads `SMTP_HOST` (required), `SMTP_PORT` (587), `SMTP_USERNAME`,
    /// `SMTP_PASSWORD`, `SMTP_USE_TLS` (true), `EMAIL_FROM_ADDRESS` (required)
    /// and `EMAIL_FROM_NAME`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("SMTP_HOST").wrap_err("SMTP_HOST not set")?,
            port: std::env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .wrap_err("Invalid SMTP_PORT")?,
            username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            password: std::env::var("SMTP_PASSWORD").unwrap_or_default(),
            from_email: std::env::var("EMAIL_FROM_ADDRESS")
                .wrap_err("EMAIL_FROM_ADDRESS not set")?,
            from_name: std::env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Admin".to_string()),
            use_tls: std::env::var("SMTP_USE_TLS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
        })
    }

    /// Unauthenticated plain SMTP on localhost:1025 (Mailpit/Mailhog).
    ///
    /// `SMTP_HOST`, `SMTP_PORT`, `EMAIL_FROM_ADDRESS` and `EMAIL_FROM_NAME`
    /// still override the defaults.
    pub fn mailhog() -> Self {
        Self {
            host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(1025),
            username: String::new(),
            password: String::new(),
            from_email: std::env::var("EMAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "noreply@localhost".to_string()),
            from_name: std::env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Development".to_string()),
            use_tls: false,
        }
    }

    fn sender(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }
}

pub struct SmtpProvider {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    config: Arc<SmtpConfig>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self> {
        let transport = if config.use_tls {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)
                .wrap_err("Failed to create SMTP relay")?
                .credentials(creds)
                .port(config.port)
                .build()
        } else if !config.username.is_empty() {
            let creds = Credentials::new(config.username.clone(), config.password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .credentials(creds)
                .port(config.port)
                .build()
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
                .port(config.port)
                .build()
        };

        tracing::debug!(host = %config.host, port = config.port, tls = config.use_tls, "SMTP transport configured");

        Ok(Self {
            transport,
            config: Arc::new(config),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(SmtpConfig::from_env()?)
    }

    pub fn mailhog() -> Result<Self> {
        Self::new(SmtpConfig::mailhog())
    }

    fn build_message(&self, email: &Email) -> Result<Message> {
        let from: Mailbox = email
            .from
            .clone()
            .unwrap_or_else(|| self.config.sender())
            .parse()
            .wrap_err("Invalid from address")?;

        let to: Mailbox = email.to.parse().wrap_err("Invalid to address")?;

        let builder = Message::builder().from(from).to(to).subject(&email.subject);

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => builder
                .multipart(
                    MultiPart::alternative()
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_PLAIN)
                                .body(text.clone()),
                        )
                        .singlepart(
                            SinglePart::builder()
                                .header(ContentType::TEXT_HTML)
                                .body(html.clone()),
                        ),
                )
                .wrap_err("Failed to build multipart message")?,
            (Some(text), None) => builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .wrap_err("Failed to build text message")?,
            (None, Some(html)) => builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .wrap_err("Failed to build HTML message")?,
            (None, None) => {
                return Err(eyre::eyre!("Email must have either text or HTML body"));
            }
        };

        Ok(message)
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        let message = self.build_message(email)?;

        let response = self
            .transport
            .send(message)
            .await
            .wrap_err("Failed to send email via SMTP")?;

        let message_id = response
            .message()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| email.id.clone());

        tracing::info!(
            email_id = %email.id,
            to = %email.to,
            subject = %email.subject,
            "Email sent"
        );

        Ok(SendResult { message_id })
    }

    async fn health_check(&self) -> Result<()> {
        self.transport
            .test_connection()
            .await
            .wrap_err("SMTP health check failed")?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local_config() -> SmtpConfig {
        SmtpConfig {
            host: "localhost".to_string(),
            port: 1025,
            username: String::new(),
            password: String::new(),
            from_email: "noreply@example.com".to_string(),
            from_name: "Admin".to_string(),
            use_tls: false,
        }
    }

    #[test]
    fn test_from_env_requires_host() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", None::<&str>),
                ("EMAIL_FROM_ADDRESS", Some("noreply@example.com")),
            ],
            || {
                let err = SmtpConfig::from_env().unwrap_err();
                assert!(err.to_string().contains("SMTP_HOST"));
            },
        );
    }

    #[test]
    fn test_from_env_reads_values() {
        temp_env::with_vars(
            [
                ("SMTP_HOST", Some("smtp.example.com")),
                ("SMTP_PORT", Some("2525")),
                ("SMTP_USE_TLS", Some("false")),
                ("EMAIL_FROM_ADDRESS", Some("noreply@example.com")),
                ("EMAIL_FROM_NAME", Some("Accounts")),
            ],
            || {
                let config = SmtpConfig::from_env().unwrap();
                assert_eq!(config.host, "smtp.example.com");
                assert_eq!(config.port, 2525);
                assert!(!config.use_tls);
                assert_eq!(config.sender(), "Accounts <noreply@example.com>");
            },
        );
    }

    #[test]
    fn test_mailhog_defaults() {
        temp_env::with_vars(
            [("SMTP_HOST", None::<&str>), ("SMTP_PORT", None::<&str>)],
            || {
                let config = SmtpConfig::mailhog();
                assert_eq!(config.host, "localhost");
                assert_eq!(config.port, 1025);
                assert!(!config.use_tls);
            },
        );
    }

    #[tokio::test]
    async fn test_build_message_uses_configured_sender() {
        let provider = SmtpProvider::new(local_config()).unwrap();
        let email = Email::new("ann@example.com", "Hello").with_text("Body");

        let raw = String::from_utf8(provider.build_message(&email).unwrap().formatted()).unwrap();
        assert!(raw.contains("From: Admin <noreply@example.com>"));
        assert!(raw.contains("To: ann@example.com"));
        assert!(raw.contains("Subject: Hello"));
    }

    #[tokio::test]
    async fn test_build_message_requires_body() {
        let provider = SmtpProvider::new(local_config()).unwrap();
        let email = Email::new("ann@example.com", "Hello");
        assert!(provider.build_message(&email).is_err());
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let provider = SmtpProvider::new(local_config()).unwrap();
        let email = Email::new("not an address", "Hello").with_text("Body");
        assert!(provider.build_message(&email).is_err());
    }
}
