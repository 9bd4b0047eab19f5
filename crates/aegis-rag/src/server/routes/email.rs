//! Report email endpoint

use axum::{
    extract::{Multipart, State},
    Json,
};

use crate::error::{Error, Result};
use crate::mail::{EmailAttachment, OutgoingEmail};
use crate::server::state::AppState;
use crate::types::MessageResponse;

/// POST /send-email - Email an attached report
///
/// Multipart fields: `recipient`, `subject`, `body`, and the file as
/// `pdf_file` (or `file`).
pub async fn send_email(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>> {
    let mailer = state.mailer().cloned().ok_or(Error::NotConfigured("SMTP"))?;

    let mut recipient = None;
    let mut subject = None;
    let mut body = None;
    let mut attachment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::InvalidRequest(format!("Failed to read multipart field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "recipient" | "subject" | "body" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| Error::InvalidRequest(format!("Failed to read {}: {}", name, e)))?;
                match name.as_str() {
                    "recipient" => recipient = Some(value),
                    "subject" => subject = Some(value),
                    _ => body = Some(value),
                }
            }
            "pdf_file" | "file" => {
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| state.config().report.filename.clone());
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/pdf".to_string());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| Error::InvalidRequest(format!("Failed to read attachment: {}", e)))?;
                attachment = Some(EmailAttachment {
                    filename,
                    content_type,
                    data: data.to_vec(),
                });
            }
            other => tracing::debug!("Ignoring multipart field '{}'", other),
        }
    }

    let required = |value: Option<String>, field: &str| {
        value.ok_or_else(|| Error::InvalidRequest(format!("missing form field '{}'", field)))
    };

    let email = OutgoingEmail {
        recipient: required(recipient, "recipient")?,
        subject: required(subject, "subject")?,
        body: body.unwrap_or_default(),
        attachment: attachment
            .ok_or_else(|| Error::InvalidRequest("missing attachment 'pdf_file'".to_string()))?,
    };

    let recipient = email.recipient.clone();
    mailer.send(email).await?;

    Ok(Json(MessageResponse::success(format!(
        "Email sent successfully to {}",
        recipient
    ))))
}
