use thiserror::Error;

use crate::domain::outgoing_mail::OutgoingMail;

#[derive(Error, Debug)]
pub enum MailSenderError {
    #[error("Failed to connect to mail service")]
    ConnectionFailed,
    #[error("Failed to send mail '{0}'")]
    SendFailed(String),
}

#[async_trait::async_trait]
pub trait MailSender: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> error_stack::Result<(), MailSenderError>;
}
