use chrono::{DateTime, Utc};
use google_gmail1::api::{Message, MessagePart};

use crate::domain::mail::{Attachment, AttachmentBody, MailMessage};

/// Converts an API message into a `MailMessage`. Attachments are the parts
/// carrying a file name, in depth-first order.
pub fn to_mail_message(message: Message) -> MailMessage {
    let id = message.id.unwrap_or_default();
    let received_at = message
        .internal_date
        .and_then(DateTime::<Utc>::from_timestamp_millis);

    let mut attachments = Vec::new();
    if let Some(payload) = message.payload {
        collect_attachments(&id, payload, &mut attachments);
    }

    MailMessage {
        id,
        received_at,
        attachments,
    }
}

fn collect_attachments(message_id: &str, part: MessagePart, attachments: &mut Vec<Attachment>) {
    let filename = part.filename.unwrap_or_default();

    if !filename.is_empty() {
        let body = part.body.unwrap_or_default();
        let body = match body.attachment_id {
            Some(attachment_id) => AttachmentBody::Remote {
                message_id: message_id.to_string(),
                attachment_id,
            },
            None => AttachmentBody::Inline(body.data.unwrap_or_default()),
        };

        attachments.push(Attachment {
            filename,
            content_type: part.mime_type.unwrap_or_default(),
            body,
        });
    }

    for child in part.parts.unwrap_or_default() {
        collect_attachments(message_id, child, attachments);
    }
}
