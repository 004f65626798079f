//! Outgoing email.
//!
//! Verification links and sale receipts leave the service through the
//! [`Mailer`] trait. Production uses [`SmtpMailer`] (lettre over STARTTLS);
//! without an SMTP relay configured, [`LogMailer`] writes messages to the log.
//! [`RecordingMailer`] keeps messages in memory for tests.

use std::sync::Mutex;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::Error as SmtpError;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::SmtpConfig;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// The mailer refused the message.
    #[error("Message rejected: {0}")]
    Rejected(String),
}

/// A plain-text message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers outgoing email.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

// =============================================================================
// Message Builders
// =============================================================================

/// Account confirmation message carrying the single-use verification link.
pub fn verification_email(to: &str, public_base_url: &str, token: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Email confirmation".to_string(),
        body: format!(
            "You are receiving this because you registered your store account.\n\n\
             Please click on the following link, or paste this into your browser to verify your email address:\n\n\
             {public_base_url}/api/auth/verify-email/{token}\n\n\
             If you did not request this, please ignore this email.\n"
        ),
    }
}

/// Receipt message sent to the customer after a sale commits.
pub fn receipt_email(to: &str, receipt: &str) -> OutgoingEmail {
    OutgoingEmail {
        to: to.to_string(),
        subject: "Your Purchase Receipt".to_string(),
        body: format!("Thank you for your purchase. Here is your receipt:\n\n{receipt}"),
    }
}

// =============================================================================
// SMTP
// =============================================================================

/// Mailer backed by an SMTP relay.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Creates an SMTP mailer using STARTTLS on the configured port.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid.
    pub fn new(config: &SmtpConfig, from_address: &str) -> Result<Self, EmailError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: from_address.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(email
                .to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?)
            .subject(&email.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(email.body)?;

        self.transport.send(message).await?;

        info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

// =============================================================================
// Log-only and recording mailers
// =============================================================================

/// Mailer that writes messages to the log instead of sending them.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        info!(
            to = %email.to,
            subject = %email.subject,
            body = %email.body,
            "SMTP not configured, email logged only"
        );
        Ok(())
    }
}

/// Mailer that keeps every message in memory. Can be told to fail.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
    failing: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer that rejects every message.
    pub fn failing() -> Self {
        RecordingMailer {
            sent: Mutex::new(Vec::new()),
            failing: true,
        }
    }

    /// Messages accepted so far.
    pub fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        if self.failing {
            return Err(EmailError::Rejected(format!("refusing mail to {}", email.to)));
        }
        self.sent
            .lock()
            .map_err(|_| EmailError::Rejected("mailbox poisoned".to_string()))?
            .push(email);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verification_email_contains_link() {
        let email = verification_email("ada@example.com", "https://shop.example.com", "abc123");
        assert_eq!(email.subject, "Email confirmation");
        assert!(email
            .body
            .contains("https://shop.example.com/api/auth/verify-email/abc123"));
    }

    #[test]
    fn test_receipt_email_wraps_receipt() {
        let email = receipt_email("grace@example.com", "Receipt for Grace");
        assert_eq!(email.subject, "Your Purchase Receipt");
        assert!(email.body.ends_with("Here is your receipt:\n\nReceipt for Grace"));
    }

    #[tokio::test]
    async fn test_recording_mailer() {
        let mailer = RecordingMailer::new();
        mailer
            .send(receipt_email("grace@example.com", "r"))
            .await
            .unwrap();
        assert_eq!(mailer.sent().len(), 1);

        let failing = RecordingMailer::failing();
        assert!(failing.send(receipt_email("grace@example.com", "r")).await.is_err());
        assert!(failing.sent().is_empty());
    }

    #[tokio::test]
    async fn test_smtp_mailer_rejects_bad_recipient() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        let mailer = SmtpMailer::new(&config, "Shopfront <no-reply@example.com>").unwrap();

        let err = mailer
            .send(receipt_email("not-an-address", "r"))
            .await
            .unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(ref addr) if addr == "not-an-address"));
    }
}
