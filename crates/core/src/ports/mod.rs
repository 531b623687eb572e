pub mod application_service;
pub mod command_handler;
pub mod csv_export_source;
pub mod mail_sender;
pub mod mail_store;
pub mod routine;
pub mod sheet_store;
