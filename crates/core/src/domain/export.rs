use chrono::NaiveDateTime;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Body of an export download together with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvDownload {
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl CsvDownload {
    /// The export endpoint answers with an HTML page instead of CSV when the
    /// session is not logged in or has no project selected.
    pub fn is_csv(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|content_type| content_type.to_ascii_lowercase().contains("text/csv"))
    }
}

/// `MANTIS CSV 2024-05-01 09:30`. Matched by the default import query.
pub fn export_subject(now: NaiveDateTime) -> String {
    format!("MANTIS CSV {}", now.format(TIMESTAMP_FORMAT))
}

/// `mantis_project_3_2024-05-01 09-30.csv`
pub fn export_filename(project_id: u32, now: NaiveDateTime) -> String {
    let stamp = now.format(TIMESTAMP_FORMAT).to_string().replace(':', "-");
    format!("mantis_project_{}_{}.csv", project_id, stamp)
}
