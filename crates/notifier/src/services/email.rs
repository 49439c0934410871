//! Outbound email transport.
//!
//! Uses SMTP via lettre for delivery. The transport sits behind the
//! [`Mailer`] trait so notification flows can be exercised in tests with a
//! stub instead of a live relay.

use std::time::Duration;

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, MultiPart, SinglePart, header::ContentType, header::ContentTypeErr},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::EmailConfig;

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

    /// Invalid attachment content type.
    #[error("Invalid content type: {0}")]
    ContentType(#[from] ContentTypeErr),

    /// The outbound send did not complete within the configured timeout.
    #[error("Mail send timed out after {0:?}")]
    Timeout(Duration),
}

/// A file attached to an outgoing email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    /// MIME type, e.g. `application/pdf`.
    pub content_type: &'static str,
    pub content: Vec<u8>,
    /// When set, the attachment is inlined and referenced from the HTML body
    /// via `cid:<id>`.
    pub inline_cid: Option<String>,
}

/// A fully composed outgoing email.
///
/// The sender address is supplied by the transport, not the composer.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Outbound mail delivery.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one email. No retries; failures surface to the caller.
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError>;
}

/// SMTP-backed [`Mailer`] used in production.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    send_timeout: Duration,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the SMTP relay configuration is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from_address: config.from_address.clone(),
            send_timeout: config.send_timeout,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutgoingEmail) -> Result<(), EmailError> {
        let to = email.to.clone();
        let subject = email.subject.clone();
        let message = compose_message(&self.from_address, email)?;

        match tokio::time::timeout(self.send_timeout, self.transport.send(message)).await {
            Ok(result) => {
                result?;
            }
            Err(_) => return Err(EmailError::Timeout(self.send_timeout)),
        }

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

/// Build a lettre message: text/html alternative, inline parts related to the
/// HTML, regular attachments mixed in at the top level.
fn compose_message(from_address: &str, email: OutgoingEmail) -> Result<Message, EmailError> {
    let alternative = MultiPart::alternative()
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_PLAIN)
                .body(email.text_body),
        )
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(email.html_body),
        );

    let (inline, regular): (Vec<_>, Vec<_>) = email
        .attachments
        .into_iter()
        .partition(|a| a.inline_cid.is_some());

    let body = if inline.is_empty() {
        MultiPart::mixed().multipart(alternative)
    } else {
        let mut related = MultiPart::related().multipart(alternative);
        for attachment in inline {
            let content_type = ContentType::parse(attachment.content_type)?;
            let cid = attachment.inline_cid.unwrap_or_default();
            related = related.singlepart(Attachment::new_inline(cid).body(attachment.content, content_type));
        }
        MultiPart::mixed().multipart(related)
    };

    let body = regular.into_iter().try_fold(body, |body, attachment| {
        let content_type = ContentType::parse(attachment.content_type)?;
        Ok::<_, EmailError>(
            body.singlepart(Attachment::new(attachment.filename).body(attachment.content, content_type)),
        )
    })?;

    let message = Message::builder()
        .from(
            from_address
                .parse()
                .map_err(|_| EmailError::InvalidAddress(from_address.to_string()))?,
        )
        .to(email
            .to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?)
        .subject(email.subject)
        .multipart(body)?;

    Ok(message)
}
