use chrono::{DateTime, Utc};

pub const CSV_CONTENT_TYPE: &str = "text/csv";
pub const CSV_EXTENSION: &str = ".csv";

/// Opaque identifier of a mail thread inside a mail store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThreadId(pub String);

impl std::fmt::Display for ThreadId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachmentBody {
    /// Payload already delivered with the message.
    Inline(Vec<u8>),
    /// Payload that has to be fetched separately from the mail store.
    Remote {
        message_id: String,
        attachment_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub body: AttachmentBody,
}

impl Attachment {
    pub fn inline(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            body: AttachmentBody::Inline(data.into()),
        }
    }

    /// True when the declared content type is `text/csv` (parameters such as
    /// `charset` ignored) or the file name ends in `.csv`.
    pub fn is_csv(&self) -> bool {
        let essence = self
            .content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();

        essence.eq_ignore_ascii_case(CSV_CONTENT_TYPE) || has_csv_extension(&self.filename)
    }
}

fn has_csv_extension(filename: &str) -> bool {
    let filename = filename.as_bytes();
    let extension = CSV_EXTENSION.as_bytes();
    filename.len() >= extension.len()
        && filename[filename.len() - extension.len()..].eq_ignore_ascii_case(extension)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub id: String,
    pub received_at: Option<DateTime<Utc>>,
    pub attachments: Vec<Attachment>,
}

/// First attachment, in list order, that looks like a CSV file.
pub fn select_csv_attachment(attachments: &[Attachment]) -> Option<&Attachment> {
    attachments.iter().find(|attachment| attachment.is_csv())
}

/// Chronologically last message of a thread. Messages without a timestamp keep
/// their position relative to each other.
pub fn latest_message(mut messages: Vec<MailMessage>) -> Option<MailMessage> {
    messages.sort_by_key(|message| message.received_at);
    messages.pop()
}
