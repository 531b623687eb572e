use error_stack::{report, ResultExt};
use google_gmail1::{api::Scope, Gmail};
use tracing::instrument;

use crate::{
    adapters::{
        config::gmail_config::GmailConfig,
        google::{
            auth,
            http_client::{self, HttpsConnector},
        },
    },
    domain::mail::{Attachment, AttachmentBody, MailMessage, ThreadId},
    ports::mail_store::{MailStore, MailStoreError},
};

use super::message_parts::to_mail_message;

pub struct GmailMailStore {
    pub config: GmailConfig,
    hub: Gmail<HttpsConnector>,
}

impl std::fmt::Debug for GmailMailStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GmailMailStore {{ config: {:?} }}", self.config)
    }
}

impl GmailMailStore {
    #[instrument(name = "GmailMailStore::new")]
    pub async fn new(config: GmailConfig) -> error_stack::Result<Self, MailStoreError> {
        let client = http_client::http_client()
            .change_context(MailStoreError::ConnectionFailed)?;
        let auth = auth::service_account_auth(
            &config.priv_key,
            config.subject.as_deref(),
            client.clone(),
        )
        .await
        .change_context(MailStoreError::ConnectionFailed)?;

        let hub = Gmail::new(client, auth);

        Ok(GmailMailStore { config, hub })
    }
}

#[async_trait::async_trait]
impl MailStore for GmailMailStore {
    #[instrument]
    async fn search_threads(
        &self,
        query: &str,
        limit: u32,
    ) -> error_stack::Result<Vec<ThreadId>, MailStoreError> {
        let (_, response) = self
            .hub
            .users()
            .threads_list(&self.config.user)
            .q(query)
            .max_results(limit)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .change_context(MailStoreError::SearchFailed)
            .attach_printable_lazy(|| format!("query: {}", query))?;

        Ok(response
            .threads
            .unwrap_or_default()
            .into_iter()
            .filter_map(|thread| thread.id)
            .map(ThreadId)
            .collect())
    }

    #[instrument]
    async fn thread_messages(
        &self,
        thread: &ThreadId,
    ) -> error_stack::Result<Vec<MailMessage>, MailStoreError> {
        let (_, response) = self
            .hub
            .users()
            .threads_get(&self.config.user, &thread.0)
            .format("full")
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .change_context_lazy(|| MailStoreError::FetchThreadFailed(thread.clone()))?;

        Ok(response
            .messages
            .unwrap_or_default()
            .into_iter()
            .map(to_mail_message)
            .collect())
    }

    #[instrument(skip(attachment), fields(filename = %attachment.filename))]
    async fn attachment_bytes(
        &self,
        attachment: &Attachment,
    ) -> error_stack::Result<Vec<u8>, MailStoreError> {
        let (message_id, attachment_id) = match &attachment.body {
            AttachmentBody::Inline(data) => return Ok(data.clone()),
            AttachmentBody::Remote {
                message_id,
                attachment_id,
            } => (message_id, attachment_id),
        };

        let (_, body) = self
            .hub
            .users()
            .messages_attachments_get(&self.config.user, message_id, attachment_id)
            .add_scope(Scope::Readonly)
            .doit()
            .await
            .change_context_lazy(|| MailStoreError::FetchAttachmentFailed(attachment_id.clone()))?;

        body.data.ok_or_else(|| {
            report!(MailStoreError::FetchAttachmentFailed(attachment_id.clone()))
                .attach_printable("attachment body has no data")
        })
    }
}
