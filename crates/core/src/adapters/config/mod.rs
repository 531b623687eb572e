pub mod app_config;
pub mod export_config;
pub mod gmail_config;
pub mod import_config;
pub mod logging_config;
pub mod sheets_config;
