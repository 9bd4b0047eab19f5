//! SMTP delivery of reports

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use std::time::Duration;

use crate::config::SmtpConfig;
use crate::error::{Error, Result};

/// A file attached to an outgoing email
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    /// MIME type; `application/pdf` when the upload did not say
    pub content_type: String,
    pub data: Vec<u8>,
}

/// An email ready to be composed
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub attachment: EmailAttachment,
}

impl OutgoingEmail {
    /// Build the MIME message: plain-text body followed by the attachment
    pub fn compose(&self, sender: &str) -> Result<Message> {
        let from: Mailbox = sender
            .parse()
            .map_err(|e| Error::Config(format!("invalid sender address {:?}: {}", sender, e)))?;
        let to: Mailbox = self
            .recipient
            .trim()
            .parse()
            .map_err(|e| Error::InvalidRequest(format!("invalid recipient {:?}: {}", self.recipient, e)))?;

        let content_type = ContentType::parse(&self.attachment.content_type)
            .or_else(|_| ContentType::parse("application/pdf"))
            .map_err(|e| Error::Email(e.to_string()))?;

        let attachment = Attachment::new(self.attachment.filename.clone())
            .body(self.attachment.data.clone(), content_type);

        Message::builder()
            .from(from)
            .to(to)
            .subject(self.subject.clone())
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::plain(self.body.clone()))
                    .singlepart(attachment),
            )
            .map_err(|e| Error::Email(e.to_string()))
    }
}

/// Trait for email delivery
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<()>;

    fn name(&self) -> &str;
}

/// STARTTLS SMTP relay authenticated with the configured login
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
    timeout: Duration,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| Error::Config(format!("invalid SMTP host {}: {}", config.host, e)))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(timeout))
            .build();

        tracing::info!("SMTP relay {}:{} as {}", config.host, config.port, config.username);

        Ok(Self {
            transport,
            sender: config.username.clone(),
            timeout,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<()> {
        let message = email.compose(&self.sender)?;

        // The transport timeout covers each socket operation; this bounds the
        // whole exchange.
        tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| Error::Timeout {
                operation: "email delivery",
                secs: self.timeout.as_secs(),
            })?
            .map_err(|e| Error::Email(e.to_string()))?;

        tracing::info!("Sent '{}' to {}", email.subject, email.recipient);
        Ok(())
    }

    fn name(&self) -> &str {
        "smtp"
    }
}
