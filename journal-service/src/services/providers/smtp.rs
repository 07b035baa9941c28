//! SMTP email provider (lettre) and its mock.

use super::{EmailMessage, EmailProvider, ProviderError, SendReceipt};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct SmtpProvider {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                ProviderError::NotConfigured(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotConfigured(
                "SMTP email provider is not enabled".to_string(),
            ));
        }

        let transport = self.transport.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("SMTP transport not initialized".to_string())
        })?;

        let from_mailbox: Mailbox =
            format!("{} <{}>", self.config.from_name, self.config.from_email)
                .parse()
                .map_err(|e| {
                    ProviderError::NotConfigured(format!("Invalid from address: {}", e))
                })?;

        let to_mailbox: Mailbox = match &email.to_name {
            Some(name) => format!("{} <{}>", name, email.to),
            None => email.to.clone(),
        }
        .parse()
        .map_err(|e| ProviderError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

        let message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email.subject);

        let message = match (&email.body_text, &email.body_html) {
            (Some(text), Some(html)) => message_builder
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
                .map_err(|e| ProviderError::SendFailed(format!("Failed to build message: {}", e)))?,
            (Some(text), None) => message_builder
                .header(ContentType::TEXT_PLAIN)
                .body(text.clone())
                .map_err(|e| ProviderError::SendFailed(format!("Failed to build message: {}", e)))?,
            (None, Some(html)) => message_builder
                .header(ContentType::TEXT_HTML)
                .body(html.clone())
                .map_err(|e| ProviderError::SendFailed(format!("Failed to build message: {}", e)))?,
            (None, None) => {
                return Err(ProviderError::SendFailed(
                    "Email must have either text or HTML body".to_string(),
                ));
            }
        };

        let response = transport
            .send(message)
            .await
            .map_err(|e| ProviderError::SendFailed(format!("Failed to send email: {}", e)))?;

        let provider_id = response.message().next().map(|s| s.to_string());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(SendReceipt { provider_id })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Ok(());
        }

        let transport = self.transport.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("SMTP transport not initialized".to_string())
        })?;

        transport.test_connection().await.map_err(|e| {
            ProviderError::NetworkError(format!("SMTP connection test failed: {}", e))
        })?;

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock email provider for tests and SMTP-less deployments.
pub struct MockEmailProvider {
    enabled: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    /// Copies of everything "sent" so far.
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mock mailbox poisoned").clone()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<SendReceipt, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock email provider is not enabled".to_string(),
            ));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .expect("mock mailbox poisoned")
            .push(email.clone());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(SendReceipt {
            provider_id: Some(format!(
                "mock-email-{}",
                self.send_count.load(Ordering::SeqCst)
            )),
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_records_sent_messages() {
        let provider = MockEmailProvider::new(true);
        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: None,
            subject: "Weekly review".to_string(),
            body_text: Some("hello".to_string()),
            body_html: None,
        };

        provider.send(&message).await.expect("mock send failed");
        provider.send(&message).await.expect("mock send failed");

        assert_eq!(provider.send_count(), 2);
        assert_eq!(provider.sent_messages()[0].subject, "Weekly review");
    }

    #[tokio::test]
    async fn disabled_mock_refuses_to_send() {
        let provider = MockEmailProvider::new(false);
        let message = EmailMessage {
            to: "user@example.com".to_string(),
            to_name: None,
            subject: "x".to_string(),
            body_text: Some("y".to_string()),
            body_html: None,
        };

        assert!(provider.send(&message).await.is_err());
        assert_eq!(provider.send_count(), 0);
    }
}
