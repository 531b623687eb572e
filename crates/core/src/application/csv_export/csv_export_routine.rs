use std::{fmt, sync::Arc};

use chrono::{Local, NaiveDateTime};
use error_stack::ResultExt;
use tracing::instrument;

use crate::{
    adapters::config::export_config::ExportConfig,
    domain::{
        export::{export_filename, export_subject},
        outgoing_mail::OutgoingMail,
        RoutineOutcome,
    },
    ports::{
        csv_export_source::CsvExportSource,
        mail_sender::MailSender,
        routine::{Routine, RoutineError},
    },
};

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Downloads the tracker's CSV export and mails it as an attachment, in the
/// shape the import routine's default query looks for.
pub struct CsvExportRoutine {
    config: ExportConfig,
    source: Arc<dyn CsvExportSource>,
    sender: Arc<dyn MailSender>,
    clock: fn() -> NaiveDateTime,
}

impl fmt::Debug for CsvExportRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvExportRoutine")
            .field("name", &self.config.name)
            .field("project_id", &self.config.mantis.project_id)
            .finish()
    }
}

impl CsvExportRoutine {
    pub fn new(
        config: ExportConfig,
        source: Arc<dyn CsvExportSource>,
        sender: Arc<dyn MailSender>,
    ) -> Self {
        Self {
            config,
            source,
            sender,
            clock: local_now,
        }
    }

    /// Replaces the wall clock used for the subject and file name.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }
}

#[async_trait::async_trait]
impl Routine for CsvExportRoutine {
    fn name(&self) -> &str {
        self.config.name.as_str()
    }

    #[instrument(skip(self), name = "CsvExportRoutine::run", fields(export = %self.config.name))]
    async fn run(&self) -> error_stack::Result<RoutineOutcome, RoutineError> {
        tracing::info!(
            "{}: Exporting project {} from {}",
            self.name(),
            self.config.mantis.project_id,
            self.config.mantis.host
        );
        let now = (self.clock)();

        let download = self
            .source
            .download_csv()
            .await
            .change_context(RoutineError::routine_failure("Failed to download CSV export"))?;

        if !download.is_csv() {
            tracing::warn!(
                "{}: ❌ Export response is not CSV (content type: {:?})",
                self.name(),
                download.content_type
            );
            return Ok(RoutineOutcome::ExportNotCsv);
        }

        let mail = OutgoingMail {
            from: self.config.sender.clone(),
            to: self.config.recipient().to_string(),
            subject: export_subject(now),
            attachment_name: export_filename(self.config.mantis.project_id, now),
            attachment: download.body,
        };
        let bytes = mail.attachment.len();

        tracing::trace!("{}: 📎 Mailing {} to {}", self.name(), mail.attachment_name, mail.to);
        self.sender
            .send(&mail)
            .await
            .change_context(RoutineError::routine_failure("Failed to send CSV export"))?;

        let outcome = RoutineOutcome::Mailed { bytes };
        tracing::info!("{}: ✅ {}", self.name(), outcome);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::{
        adapters::{
            config::{export_config::MantisConfig, import_config::ImportConfig},
            memory::{
                InMemoryExportSource, InMemoryMailSender, InMemoryMailStore, InMemorySheetStore,
            },
        },
        application::csv_import::{
            csv_import_routine::CsvImportRoutine, destination_locks::DestinationLocks,
        },
        domain::mail::{Attachment, MailMessage},
        ports::sheet_store::SheetStore,
    };

    const CSV: &str = "id,summary\n1,ログインできない\n";

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn config() -> ExportConfig {
        ExportConfig {
            name: "mantis-mailer".to_string(),
            mantis: MantisConfig {
                host: "http://mantis.example.com".to_string(),
                username: "reporter".to_string(),
                password: "secret".to_string(),
                project_id: 7,
                webdriver_url: "http://localhost:4444".to_string(),
            },
            sender: "ops@example.com".to_string(),
            recipient: None,
        }
    }

    fn routine(
        config: ExportConfig,
        source: &Arc<InMemoryExportSource>,
        sender: &Arc<InMemoryMailSender>,
    ) -> CsvExportRoutine {
        CsvExportRoutine::new(
            config,
            Arc::clone(source) as Arc<dyn CsvExportSource>,
            Arc::clone(sender) as Arc<dyn MailSender>,
        )
        .with_clock(fixed_now)
    }

    #[tokio::test]
    async fn test_csv_is_mailed_to_sender() {
        let source = Arc::new(InMemoryExportSource::new("text/csv; charset=UTF-8", CSV));
        let sender = Arc::new(InMemoryMailSender::new());

        let outcome = routine(config(), &source, &sender).run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::Mailed { bytes: CSV.len() });
        assert_eq!(
            sender.sent().await,
            vec![OutgoingMail {
                from: "ops@example.com".to_string(),
                to: "ops@example.com".to_string(),
                subject: "MANTIS CSV 2024-05-01 09:30".to_string(),
                attachment_name: "mantis_project_7_2024-05-01 09-30.csv".to_string(),
                attachment: CSV.as_bytes().to_vec(),
            }]
        );
    }

    #[tokio::test]
    async fn test_recipient_override() {
        let source = Arc::new(InMemoryExportSource::new("text/csv", CSV));
        let sender = Arc::new(InMemoryMailSender::new());
        let config = ExportConfig {
            recipient: Some("team@example.com".to_string()),
            ..config()
        };

        routine(config, &source, &sender).run().await.unwrap();

        let sent = sender.sent().await;
        assert_eq!(sent[0].from, "ops@example.com");
        assert_eq!(sent[0].to, "team@example.com");
    }

    #[tokio::test]
    async fn test_html_response_is_not_mailed() {
        let source = Arc::new(InMemoryExportSource::new(
            "text/html; charset=UTF-8",
            "<html>login</html>",
        ));
        let sender = Arc::new(InMemoryMailSender::new());

        let outcome = routine(config(), &source, &sender).run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::ExportNotCsv);
        assert!(sender.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_download_failure_is_an_error() {
        let source = Arc::new(InMemoryExportSource::failing());
        let sender = Arc::new(InMemoryMailSender::new());

        let report = routine(config(), &source, &sender).run().await.unwrap_err();

        assert!(matches!(
            report.current_context(),
            RoutineError::RoutineFailure { .. }
        ));
        assert_eq!(source.download_count().await, 1);
        assert!(sender.sent().await.is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_is_an_error() {
        let source = Arc::new(InMemoryExportSource::new("text/csv", CSV));
        let sender = Arc::new(InMemoryMailSender::rejecting());

        assert!(routine(config(), &source, &sender).run().await.is_err());
    }

    #[tokio::test]
    async fn test_mailed_export_is_picked_up_by_default_import() {
        let source = Arc::new(InMemoryExportSource::new("text/csv", CSV));
        let sender = Arc::new(InMemoryMailSender::new());
        routine(config(), &source, &sender).run().await.unwrap();

        // Delivered attachments arrive as application/octet-stream.
        let received: Vec<MailMessage> = sender
            .sent()
            .await
            .iter()
            .map(|mail| MailMessage {
                id: "m1".to_string(),
                received_at: None,
                attachments: vec![Attachment::inline(
                    mail.attachment_name.clone(),
                    "application/octet-stream",
                    mail.attachment.clone(),
                )],
            })
            .collect();
        let sheets = Arc::new(InMemorySheetStore::new("spreadsheet").with_sheet("MANTIS"));
        let import = CsvImportRoutine::new(
            ImportConfig::named("mantis"),
            Arc::new(InMemoryMailStore::new().with_thread("t1", received)),
            Arc::clone(&sheets) as Arc<dyn SheetStore>,
            Arc::new(DestinationLocks::new()),
        );

        let outcome = import.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::Imported { rows: 2, columns: 2 });
        let snapshot = sheets.snapshot("MANTIS").await.unwrap();
        assert_eq!(snapshot.cell(1, 1), Some("ログインできない"));
    }
}
