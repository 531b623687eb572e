pub mod spreadsheet_manager;
pub mod spreadsheet_read;
pub mod value_range_factory;
