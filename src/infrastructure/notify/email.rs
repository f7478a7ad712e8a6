use async_trait::async_trait;
use chrono::Local;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use super::digest::{digest_body, digest_subject};
use super::Notifier;
use crate::shared::config::EmailSettings;
use crate::shared::errors::NotifyError;
use crate::shared::types::DealResult;

/// Sends the deal digest over SMTP with STARTTLS
pub struct EmailNotifier {
    settings: EmailSettings,
}

impl EmailNotifier {
    pub fn new(settings: EmailSettings) -> Self {
        Self { settings }
    }

    pub fn build_message(&self, deals: &[DealResult]) -> Result<Message, NotifyError> {
        let from: Mailbox = self.settings.sender.parse()?;
        let to: Mailbox = self.settings.recipient.parse()?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(digest_subject(deals))
            .header(ContentType::TEXT_HTML)
            .body(digest_body(deals, Local::now()))?;

        Ok(message)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn notify(&self, deals: &[DealResult]) -> Result<(), NotifyError> {
        let message = self.build_message(deals)?;
        let settings = self.settings.clone();

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || -> Result<(), NotifyError> {
            let mailer = SmtpTransport::starttls_relay(&settings.smtp_host)?
                .port(settings.smtp_port)
                .credentials(Credentials::new(settings.sender.clone(), settings.password.clone()))
                .build();
            mailer.send(&message)?;
            Ok(())
        })
        .await
        .map_err(|e| NotifyError::Task(e.to_string()))??;

        info!("Email sent to {}", self.settings.recipient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn settings() -> EmailSettings {
        EmailSettings {
            enabled: true,
            sender: "watcher@example.com".to_string(),
            recipient: "me@example.com".to_string(),
            ..EmailSettings::default()
        }
    }

    fn deals() -> Vec<DealResult> {
        vec![DealResult {
            name: "Dell Inspiron 15 Laptop".to_string(),
            url: "https://www.amazon.com/dp/XXXXXXXXXX".to_string(),
            current_price: Decimal::new(64999, 2),
            alerts: vec!["Below target price! $649.99 ≤ $699.00".to_string()],
        }]
    }

    #[test]
    fn test_build_message() {
        let notifier = EmailNotifier::new(settings());
        let message = notifier.build_message(&deals()).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("To: me@example.com"));
        assert!(raw.contains("From: watcher@example.com"));
        assert!(raw.contains("Content-Type: text/html"));
    }

    #[test]
    fn test_invalid_recipient() {
        let notifier = EmailNotifier::new(EmailSettings {
            recipient: "not an address".to_string(),
            ..settings()
        });
        let err = notifier.build_message(&deals()).unwrap_err();
        assert!(matches!(err, NotifyError::Address(_)));
    }
}
