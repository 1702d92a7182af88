//! Capturing email provider for tests

use super::{EmailProvider, SendResult};
use crate::models::Email;
use async_trait::async_trait;
use eyre::Result;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Records every message it is asked to send.
///
/// Clones share the same outbox, so a test can hand one clone to the code
/// under test and inspect the other.
#[derive(Clone)]
pub struct MockSmtpProvider {
    sent_emails: Arc<Mutex<Vec<Email>>>,
    failure_message: Option<String>,
}

impl MockSmtpProvider {
    pub fn new() -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            failure_message: None,
        }
    }

    /// A provider whose `send` and `health_check` always fail
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            sent_emails: Arc::new(Mutex::new(Vec::new())),
            failure_message: Some(message.into()),
        }
    }

    pub async fn sent_emails(&self) -> Vec<Email> {
        self.sent_emails.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent_emails.lock().await.len()
    }

    pub async fn last_sent(&self) -> Option<Email> {
        self.sent_emails.lock().await.last().cloned()
    }

    pub async fn was_sent_to(&self, address: &str) -> bool {
        self.sent_emails
            .lock()
            .await
            .iter()
            .any(|e| e.to == address)
    }
}

impl Default for MockSmtpProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailProvider for MockSmtpProvider {
    async fn send(&self, email: &Email) -> Result<SendResult> {
        if let Some(message) = &self.failure_message {
            return Err(eyre::eyre!("{}", message));
        }

        self.sent_emails.lock().await.push(email.clone());

        Ok(SendResult {
            message_id: format!("mock-{}", email.id),
        })
    }

    async fn health_check(&self) -> Result<()> {
        match &self.failure_message {
            Some(_) => Err(eyre::eyre!("Mock health check failed")),
            None => Ok(()),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
