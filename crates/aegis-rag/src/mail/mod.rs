//! Outbound email with report attachments

pub mod mailer;

pub use mailer::{EmailAttachment, Mailer, OutgoingEmail, SmtpMailer};
