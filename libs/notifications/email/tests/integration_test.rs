//! End-to-end checks across templates, the mailer and the capturing provider

use email::{Email, EmailProvider, MockSmtpProvider, TemplateEngine, TemplateMailer, ACCOUNT_ACTIVATION};
use serde_json::json;

#[tokio::test]
async fn test_activation_mail_reaches_outbox() {
    let outbox = MockSmtpProvider::new();
    let mailer = TemplateMailer::new(outbox.clone(), TemplateEngine::new().unwrap());

    let email = Email::new("new.user@example.com", "Activate your account")
        .with_from("Admin <noreply@example.com>")
        .with_template(
            ACCOUNT_ACTIVATION,
            json!({
                "name": "New User",
                "activationCode": "5f1c3d9e-8b7a-4e2f-a1c0-6d5e4f3a2b1c",
                "expiresInMinutes": 5,
                "appName": "Admin"
            }),
        );

    let result = mailer.send(&email).await.unwrap();
    assert!(result.message_id.starts_with("mock-"));

    assert!(outbox.was_sent_to("new.user@example.com").await);
    let sent = outbox.last_sent().await.unwrap();
    assert_eq!(sent.from.as_deref(), Some("Admin <noreply@example.com>"));
    assert!(sent
        .body_html
        .unwrap()
        .contains("5f1c3d9e-8b7a-4e2f-a1c0-6d5e4f3a2b1c"));
}

#[tokio::test]
async fn test_provider_failure_surfaces() {
    let mailer = TemplateMailer::new(
        MockSmtpProvider::failing("connection refused"),
        TemplateEngine::new().unwrap(),
    );
    let email = Email::new("a@example.com", "Hi").with_text("Body");

    let err = mailer.send(&email).await.unwrap_err();
    assert!(err.to_string().contains("connection refused"));
}
