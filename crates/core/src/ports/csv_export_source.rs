use thiserror::Error;

use crate::domain::export::CsvDownload;

#[derive(Error, Debug)]
pub enum ExportSourceError {
    #[error("Failed to start a browser session")]
    BrowserUnavailable,
    #[error("Failed to log in")]
    LoginFailed,
    #[error("Failed to select project {0}")]
    ProjectSelectionFailed(u32),
    #[error("Failed to download the CSV export")]
    DownloadFailed,
}

/// Issue tracker that can export a project's issues as CSV.
#[async_trait::async_trait]
pub trait CsvExportSource: Send + Sync {
    async fn download_csv(&self) -> error_stack::Result<CsvDownload, ExportSourceError>;
}
