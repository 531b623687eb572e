use std::collections::HashMap;

use error_stack::report;
use tokio::sync::Mutex;

use crate::{
    domain::mail::{Attachment, AttachmentBody, MailMessage, ThreadId},
    ports::mail_store::{MailStore, MailStoreError},
};

/// Mailbox held in memory. Every thread matches every query; threads are
/// returned in insertion order, which callers treat as newest first.
#[derive(Debug, Default)]
pub struct InMemoryMailStore {
    threads: Vec<(ThreadId, Vec<MailMessage>)>,
    remote_payloads: HashMap<(String, String), Vec<u8>>,
    searches: Mutex<Vec<(String, u32)>>,
}

impl InMemoryMailStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread(mut self, id: impl Into<String>, messages: Vec<MailMessage>) -> Self {
        self.threads.push((ThreadId(id.into()), messages));
        self
    }

    pub fn with_remote_payload(
        mut self,
        message_id: impl Into<String>,
        attachment_id: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.remote_payloads
            .insert((message_id.into(), attachment_id.into()), data.into());
        self
    }

    /// Queries seen so far, with their limits.
    pub async fn searches(&self) -> Vec<(String, u32)> {
        self.searches.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl MailStore for InMemoryMailStore {
    async fn search_threads(
        &self,
        query: &str,
        limit: u32,
    ) -> error_stack::Result<Vec<ThreadId>, MailStoreError> {
        self.searches.lock().await.push((query.to_string(), limit));

        Ok(self
            .threads
            .iter()
            .take(limit as usize)
            .map(|(id, _)| id.clone())
            .collect())
    }

    async fn thread_messages(
        &self,
        thread: &ThreadId,
    ) -> error_stack::Result<Vec<MailMessage>, MailStoreError> {
        self.threads
            .iter()
            .find(|(id, _)| id == thread)
            .map(|(_, messages)| messages.clone())
            .ok_or_else(|| report!(MailStoreError::FetchThreadFailed(thread.clone())))
    }

    async fn attachment_bytes(
        &self,
        attachment: &Attachment,
    ) -> error_stack::Result<Vec<u8>, MailStoreError> {
        match &attachment.body {
            AttachmentBody::Inline(data) => Ok(data.clone()),
            AttachmentBody::Remote {
                message_id,
                attachment_id,
            } => self
                .remote_payloads
                .get(&(message_id.clone(), attachment_id.clone()))
                .cloned()
                .ok_or_else(|| {
                    report!(MailStoreError::FetchAttachmentFailed(attachment_id.clone()))
                }),
        }
    }
}
