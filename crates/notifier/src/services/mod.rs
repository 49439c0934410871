//! Services for outbound notifications.

pub mod email;
pub mod notifications;

pub use email::{EmailAttachment, EmailError, Mailer, OutgoingEmail, SmtpMailer};
pub use notifications::{Logo, Notifier, NotifyError};
