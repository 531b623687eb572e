use error_stack::report;
use tokio::sync::Mutex;

use crate::{
    domain::outgoing_mail::OutgoingMail,
    ports::mail_sender::{MailSender, MailSenderError},
};

/// Keeps sent mail instead of delivering it.
#[derive(Debug, Default)]
pub struct InMemoryMailSender {
    sent: Mutex<Vec<OutgoingMail>>,
    rejects_everything: bool,
}

impl InMemoryMailSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender whose every delivery fails.
    pub fn rejecting() -> Self {
        Self {
            rejects_everything: true,
            ..Self::default()
        }
    }

    pub async fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl MailSender for InMemoryMailSender {
    async fn send(&self, mail: &OutgoingMail) -> error_stack::Result<(), MailSenderError> {
        if self.rejects_everything {
            return Err(report!(MailSenderError::SendFailed(mail.subject.clone())));
        }

        self.sent.lock().await.push(mail.clone());
        Ok(())
    }
}
