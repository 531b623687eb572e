use thiserror::Error;

use crate::domain::mail::{Attachment, MailMessage, ThreadId};

#[derive(Error, Debug)]
pub enum MailStoreError {
    #[error("Failed to connect to mail store")]
    ConnectionFailed,
    #[error("Failed to search threads")]
    SearchFailed,
    #[error("Failed to fetch thread {0}")]
    FetchThreadFailed(ThreadId),
    #[error("Failed to fetch attachment {0}")]
    FetchAttachmentFailed(String),
}

#[async_trait::async_trait]
pub trait MailStore: Send + Sync {
    /// Threads matching `query`, newest first, at most `limit` of them.
    async fn search_threads(
        &self,
        query: &str,
        limit: u32,
    ) -> error_stack::Result<Vec<ThreadId>, MailStoreError>;

    /// Messages of a thread in chronological order, with attachment metadata.
    async fn thread_messages(
        &self,
        thread: &ThreadId,
    ) -> error_stack::Result<Vec<MailMessage>, MailStoreError>;

    /// Raw attachment payload.
    async fn attachment_bytes(
        &self,
        attachment: &Attachment,
    ) -> error_stack::Result<Vec<u8>, MailStoreError>;
}
