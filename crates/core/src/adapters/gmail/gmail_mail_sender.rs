use std::io::Cursor;

use error_stack::ResultExt;
use google_gmail1::{
    api::{Message, Scope},
    Gmail,
};
use tracing::instrument;

use crate::{
    adapters::{
        config::gmail_config::GmailConfig,
        google::{
            auth,
            http_client::{self, HttpsConnector},
        },
    },
    domain::outgoing_mail::OutgoingMail,
    ports::mail_sender::{MailSender, MailSenderError},
};

const RFC822_MIME: &str = "message/rfc822";

pub struct GmailMailSender {
    pub config: GmailConfig,
    hub: Gmail<HttpsConnector>,
}

impl std::fmt::Debug for GmailMailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "GmailMailSender {{ config: {:?} }}", self.config)
    }
}

impl GmailMailSender {
    #[instrument(name = "GmailMailSender::new")]
    pub async fn new(config: GmailConfig) -> error_stack::Result<Self, MailSenderError> {
        let client = http_client::http_client()
            .change_context(MailSenderError::ConnectionFailed)?;
        let auth = auth::service_account_auth(
            &config.priv_key,
            config.subject.as_deref(),
            client.clone(),
        )
        .await
        .change_context(MailSenderError::ConnectionFailed)?;

        let hub = Gmail::new(client, auth);

        Ok(GmailMailSender { config, hub })
    }
}

#[async_trait::async_trait]
impl MailSender for GmailMailSender {
    #[instrument(skip(self, mail), fields(subject = %mail.subject, to = %mail.to))]
    async fn send(&self, mail: &OutgoingMail) -> error_stack::Result<(), MailSenderError> {
        let mime_type: mime::Mime = RFC822_MIME
            .parse::<mime::Mime>()
            .change_context_lazy(|| MailSenderError::SendFailed(mail.subject.clone()))?;

        let (_, sent) = self
            .hub
            .users()
            .messages_send(Message::default(), &self.config.user)
            .add_scope(Scope::Send)
            .upload(Cursor::new(mail.to_rfc5322()), mime_type)
            .await
            .change_context_lazy(|| MailSenderError::SendFailed(mail.subject.clone()))
            .attach_printable_lazy(|| format!("recipient: {}", mail.to))?;

        tracing::debug!("📤 Sent message {}", sent.id.unwrap_or_default());
        Ok(())
    }
}
