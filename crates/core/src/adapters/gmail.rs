pub mod gmail_mail_sender;
pub mod gmail_mail_store;
pub mod message_parts;
