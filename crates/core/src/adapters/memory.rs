pub mod in_memory_export_source;
pub mod in_memory_mail_sender;
pub mod in_memory_mail_store;
pub mod in_memory_sheet_store;

pub use in_memory_export_source::InMemoryExportSource;
pub use in_memory_mail_sender::InMemoryMailSender;
pub use in_memory_mail_store::InMemoryMailStore;
pub use in_memory_sheet_store::{InMemorySheetStore, SheetOperation};
