use error_stack::report;
use tokio::sync::Mutex;

use crate::{
    domain::export::CsvDownload,
    ports::csv_export_source::{CsvExportSource, ExportSourceError},
};

/// Serves a fixed download, or fails every time when built with `failing`.
#[derive(Debug)]
pub struct InMemoryExportSource {
    download: Option<CsvDownload>,
    downloads: Mutex<usize>,
}

impl InMemoryExportSource {
    pub fn new(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            download: Some(CsvDownload {
                content_type: Some(content_type.to_string()),
                body: body.into(),
            }),
            downloads: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            download: None,
            downloads: Mutex::new(0),
        }
    }

    pub async fn download_count(&self) -> usize {
        *self.downloads.lock().await
    }
}

#[async_trait::async_trait]
impl CsvExportSource for InMemoryExportSource {
    async fn download_csv(&self) -> error_stack::Result<CsvDownload, ExportSourceError> {
        *self.downloads.lock().await += 1;

        self.download
            .clone()
            .ok_or_else(|| report!(ExportSourceError::DownloadFailed))
    }
}
