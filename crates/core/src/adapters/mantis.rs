pub mod mantis_csv_exporter;
pub mod webdriver_session;
