use std::{fmt, sync::Arc};

use error_stack::{report, ResultExt};
use tracing::instrument;

use crate::{
    adapters::config::import_config::ImportConfig,
    domain::{
        mail::{latest_message, select_csv_attachment},
        sheets::{cell_position::CellPosition, cell_range::CellRange},
        RoutineOutcome, Table,
    },
    ports::{
        mail_store::MailStore,
        routine::{Routine, RoutineError},
        sheet_store::{SheetRef, SheetStore},
    },
};

use super::{csv_decode::decode_csv, destination_locks::DestinationLocks};

/// Finds the newest mail matching the job's query and replaces the destination
/// sheet with the CSV attached to its last message.
pub struct CsvImportRoutine {
    config: ImportConfig,
    mail_store: Arc<dyn MailStore>,
    sheet_store: Arc<dyn SheetStore>,
    locks: Arc<DestinationLocks>,
}

impl fmt::Debug for CsvImportRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsvImportRoutine")
            .field("name", &self.config.name)
            .field("sheet_name", &self.config.sheet_name)
            .finish()
    }
}

impl CsvImportRoutine {
    pub fn new(
        config: ImportConfig,
        mail_store: Arc<dyn MailStore>,
        sheet_store: Arc<dyn SheetStore>,
        locks: Arc<DestinationLocks>,
    ) -> Self {
        Self {
            config,
            mail_store,
            sheet_store,
            locks,
        }
    }

    /// Leaves a diagnostic in A1 without clearing anything else.
    #[instrument(skip(self, sheet))]
    async fn report_not_found(
        &self,
        sheet: &SheetRef,
        message: &str,
        outcome: RoutineOutcome,
    ) -> error_stack::Result<RoutineOutcome, RoutineError> {
        tracing::warn!("{}: ⚠️  {}", self.name(), outcome);

        let lock = self.locks.lock_for(sheet).await;
        let _guard = lock.lock().await;

        self.sheet_store
            .write_cell(sheet, CellPosition::origin(), message)
            .await
            .change_context(RoutineError::routine_failure(
                "Failed to write diagnostic message",
            ))?;

        Ok(outcome)
    }

    async fn fetch_table(
        &self,
        sheet: &SheetRef,
    ) -> error_stack::Result<Result<Table, RoutineOutcome>, RoutineError> {
        tracing::trace!("{}: ✉️  Searching mailbox: {}", self.name(), self.config.query);
        let threads = self
            .mail_store
            .search_threads(&self.config.query, self.config.result_limit)
            .await
            .change_context(RoutineError::routine_failure("Failed to search mailbox"))?;

        let Some(thread) = threads.first() else {
            let outcome = self
                .report_not_found(
                    sheet,
                    &self.config.mail_not_found_message,
                    RoutineOutcome::MailNotFound,
                )
                .await?;
            return Ok(Err(outcome));
        };

        tracing::trace!("{}: 📬 Reading thread {}", self.name(), thread);
        let messages = self
            .mail_store
            .thread_messages(thread)
            .await
            .change_context(RoutineError::routine_failure("Failed to read thread"))?;

        let attachment = latest_message(messages).and_then(|message| {
            select_csv_attachment(&message.attachments).cloned()
        });

        let Some(attachment) = attachment else {
            let outcome = self
                .report_not_found(
                    sheet,
                    &self.config.attachment_not_found_message,
                    RoutineOutcome::AttachmentNotFound,
                )
                .await?;
            return Ok(Err(outcome));
        };

        tracing::trace!("{}: 📎 Downloading {}", self.name(), attachment.filename);
        let bytes = self
            .mail_store
            .attachment_bytes(&attachment)
            .await
            .change_context(RoutineError::routine_failure(
                "Failed to download attachment",
            ))?;

        let table = decode_csv(&bytes, self.config.ragged_rows)
            .change_context(RoutineError::routine_failure("Failed to parse CSV attachment"))
            .attach_printable_lazy(|| format!("attachment: {}", attachment.filename))?;

        Ok(Ok(table))
    }

    async fn replace_contents(
        &self,
        sheet: &SheetRef,
        table: &Table,
    ) -> error_stack::Result<(), RoutineError> {
        let lock = self.locks.lock_for(sheet).await;
        let _guard = lock.lock().await;

        self.sheet_store
            .clear_contents(sheet)
            .await
            .change_context(RoutineError::routine_failure("Failed to clear sheet"))?;

        if table.is_empty() {
            tracing::warn!("{}: CSV attachment has no rows", self.name());
            return Ok(());
        }

        self.sheet_store
            .write_block(sheet, CellPosition::origin(), table)
            .await
            .change_context(RoutineError::routine_failure("Failed to write table"))
    }

    async fn verify(&self, sheet: &SheetRef, table: &Table) -> error_stack::Result<(), RoutineError> {
        let Some(range) = CellRange::from_anchor_and_size(
            CellPosition::origin(),
            table.row_count() as u32,
            table.column_count() as u32,
        ) else {
            return Ok(());
        };

        let written = self
            .sheet_store
            .read_block(sheet, &range)
            .await
            .change_context(RoutineError::routine_failure("Failed to read back table"))?;

        if &written != table {
            return Err(report!(RoutineError::VerificationFailed))
                .attach_printable_lazy(|| format!("sheet: {}", sheet.title));
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl Routine for CsvImportRoutine {
    fn name(&self) -> &str {
        self.config.name.as_str()
    }

    #[instrument(skip(self), name = "CsvImportRoutine::run", fields(import = %self.config.name))]
    async fn run(&self) -> error_stack::Result<RoutineOutcome, RoutineError> {
        tracing::info!("{}: Running import into '{}'", self.name(), self.config.sheet_name);

        let sheet = self
            .sheet_store
            .resolve_sheet(&self.config.sheet_name)
            .await
            .change_context(RoutineError::routine_failure(
                "Failed to resolve destination sheet",
            ))?;

        let table = match self.fetch_table(&sheet).await? {
            Ok(table) => table,
            Err(outcome) => return Ok(outcome),
        };

        tracing::trace!(
            "{}: 📝 Writing {} rows x {} columns",
            self.name(),
            table.row_count(),
            table.column_count()
        );
        self.replace_contents(&sheet, &table).await?;

        if self.config.verify_after_write {
            tracing::trace!("{}: 🔍 Verifying written block", self.name());
            self.verify(&sheet, &table).await?;
        }

        let outcome = RoutineOutcome::Imported {
            rows: table.row_count(),
            columns: table.column_count(),
        };
        tracing::info!("{}: ✅ {}", self.name(), outcome);

        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::{
            config::import_config::{
                DEFAULT_ATTACHMENT_NOT_FOUND_MESSAGE, DEFAULT_MAIL_NOT_FOUND_MESSAGE,
                DEFAULT_QUERY,
            },
            memory::{InMemoryMailStore, InMemorySheetStore, SheetOperation},
        },
        domain::{
            mail::{Attachment, AttachmentBody, MailMessage},
            RaggedRowPolicy,
        },
        ports::sheet_store::SheetStoreError,
    };
    use chrono::{TimeZone, Utc};

    const SHEET: &str = "MANTIS";

    fn message(id: &str, ts: i64, attachments: Vec<Attachment>) -> MailMessage {
        MailMessage {
            id: id.to_string(),
            received_at: Utc.timestamp_opt(ts, 0).single(),
            attachments,
        }
    }

    fn csv(name: &str, contents: &str) -> Attachment {
        Attachment::inline(name, "text/csv", contents)
    }

    fn prefilled_sheets() -> Arc<InMemorySheetStore> {
        Arc::new(InMemorySheetStore::new("spreadsheet").with_sheet_contents(
            SHEET,
            &[&["old", "data", "here"], &["more", "old", "rows"], &["x", "y", "z"]],
        ))
    }

    fn routine(
        config: ImportConfig,
        mail: InMemoryMailStore,
        sheets: &Arc<InMemorySheetStore>,
    ) -> CsvImportRoutine {
        CsvImportRoutine::new(
            config,
            Arc::new(mail),
            Arc::clone(sheets) as Arc<dyn SheetStore>,
            Arc::new(DestinationLocks::new()),
        )
    }

    fn table(rows: &[&[&str]]) -> Table {
        let records = rows
            .iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        Table::from_records(records, RaggedRowPolicy::Reject).unwrap()
    }

    #[tokio::test]
    async fn test_no_matching_thread_writes_diagnostic_without_clearing() {
        let sheets = prefilled_sheets();
        let routine = routine(ImportConfig::named("mantis"), InMemoryMailStore::new(), &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::MailNotFound);
        assert_eq!(
            sheets.snapshot(SHEET).await.unwrap(),
            table(&[
                &[DEFAULT_MAIL_NOT_FOUND_MESSAGE, "data", "here"],
                &["more", "old", "rows"],
                &["x", "y", "z"],
            ])
        );
        assert!(!sheets
            .operations(SHEET)
            .await
            .contains(&SheetOperation::Clear));
    }

    #[tokio::test]
    async fn test_no_csv_attachment_writes_diagnostic_without_clearing() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message(
                "m1",
                10,
                vec![Attachment::inline("photo.png", "image/png", "png")],
            )],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::AttachmentNotFound);
        let snapshot = sheets.snapshot(SHEET).await.unwrap();
        assert_eq!(snapshot.cell(0, 0), Some(DEFAULT_ATTACHMENT_NOT_FOUND_MESSAGE));
        assert_eq!(snapshot.cell(2, 2), Some("z"));
        assert_eq!(
            sheets.operations(SHEET).await,
            vec![SheetOperation::WriteCell {
                value: DEFAULT_ATTACHMENT_NOT_FOUND_MESSAGE.to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_thread_without_messages_counts_as_missing_attachment() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread("t1", vec![]);
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::AttachmentNotFound);
        let snapshot = sheets.snapshot(SHEET).await.unwrap();
        assert_eq!(snapshot.cell(0, 0), Some(DEFAULT_ATTACHMENT_NOT_FOUND_MESSAGE));
        assert_eq!(snapshot.cell(1, 0), Some("more"));
        assert!(!sheets
            .operations(SHEET)
            .await
            .contains(&SheetOperation::Clear));
    }

    #[tokio::test]
    async fn test_only_last_message_is_considered() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![
                message("m1", 10, vec![csv("old.csv", "a,b")]),
                message("m2", 20, vec![]),
            ],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        assert_eq!(routine.run().await.unwrap(), RoutineOutcome::AttachmentNotFound);
    }

    #[tokio::test]
    async fn test_csv_replaces_previous_contents() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message("m1", 10, vec![csv("mantis.csv", "a,b\nc,d\n")])],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::Imported { rows: 2, columns: 2 });
        assert_eq!(
            sheets.snapshot(SHEET).await.unwrap(),
            table(&[&["a", "b"], &["c", "d"]])
        );
        assert_eq!(
            sheets.operations(SHEET).await,
            vec![
                SheetOperation::Clear,
                SheetOperation::WriteBlock { rows: 2, columns: 2 }
            ]
        );
    }

    #[tokio::test]
    async fn test_newest_thread_and_last_message_win() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new()
            .with_thread(
                "newest",
                vec![
                    message("m2", 20, vec![csv("new.csv", "new")]),
                    message("m1", 10, vec![csv("older.csv", "older")]),
                ],
            )
            .with_thread("older", vec![message("m0", 5, vec![csv("old.csv", "old")])]);
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        routine.run().await.unwrap();

        assert_eq!(sheets.snapshot(SHEET).await.unwrap(), table(&[&["new"]]));
    }

    #[tokio::test]
    async fn test_query_and_limit_are_forwarded() {
        let sheets = prefilled_sheets();
        let mail = Arc::new(InMemoryMailStore::new());
        let routine = CsvImportRoutine::new(
            ImportConfig::named("mantis"),
            Arc::clone(&mail) as Arc<dyn MailStore>,
            Arc::clone(&sheets) as Arc<dyn SheetStore>,
            Arc::new(DestinationLocks::new()),
        );

        routine.run().await.unwrap();

        assert_eq!(mail.searches().await, vec![(DEFAULT_QUERY.to_string(), 10)]);
    }

    #[tokio::test]
    async fn test_csv_extension_selected_despite_other_content_type() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new()
            .with_thread(
                "t1",
                vec![message(
                    "m1",
                    10,
                    vec![Attachment {
                        filename: "mantis_project_1.csv".to_string(),
                        content_type: "application/octet-stream".to_string(),
                        body: AttachmentBody::Remote {
                            message_id: "m1".to_string(),
                            attachment_id: "a1".to_string(),
                        },
                    }],
                )],
            )
            .with_remote_payload("m1", "a1", "id,summary\n1,crash\n");
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::Imported { rows: 2, columns: 2 });
        assert_eq!(sheets.snapshot(SHEET).await.unwrap().cell(1, 1), Some("crash"));
    }

    #[tokio::test]
    async fn test_running_twice_is_idempotent() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message("m1", 10, vec![csv("mantis.csv", "a,b\nc,d\n")])],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        routine.run().await.unwrap();
        let once = sheets.snapshot(SHEET).await.unwrap();
        routine.run().await.unwrap();
        let twice = sheets.snapshot(SHEET).await.unwrap();

        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn test_written_block_reads_back_identically() {
        let sheets = prefilled_sheets();
        let contents = "id,summary,status\n1,\"Crash, on start\",new\n2,\"multi\nline\",closed\n";
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message("m1", 10, vec![csv("mantis.csv", contents)])],
        );
        let config = ImportConfig {
            verify_after_write: true,
            ..ImportConfig::named("mantis")
        };
        let routine = routine(config, mail, &sheets);

        let outcome = routine.run().await.unwrap();
        assert_eq!(outcome, RoutineOutcome::Imported { rows: 3, columns: 3 });

        let sheet = sheets.resolve_sheet(SHEET).await.unwrap();
        let range = CellRange::from_anchor_and_size(CellPosition::origin(), 3, 3).unwrap();
        let read_back = sheets.read_block(&sheet, &range).await.unwrap();
        assert_eq!(read_back, decode_csv(contents.as_bytes(), RaggedRowPolicy::Pad).unwrap());
    }

    #[tokio::test]
    async fn test_ragged_csv_rejected_before_touching_sheet() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message("m1", 10, vec![csv("mantis.csv", "a,b\nc\n")])],
        );
        let config = ImportConfig {
            ragged_rows: RaggedRowPolicy::Reject,
            ..ImportConfig::named("mantis")
        };
        let routine = routine(config, mail, &sheets);

        assert!(routine.run().await.is_err());
        assert!(sheets.operations(SHEET).await.is_empty());
    }

    #[tokio::test]
    async fn test_ragged_csv_padded_by_default() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message("m1", 10, vec![csv("mantis.csv", "a\nb,c\n")])],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::Imported { rows: 2, columns: 2 });
        assert_eq!(
            sheets.snapshot(SHEET).await.unwrap(),
            table(&[&["a", ""], &["b", "c"]])
        );
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_unrecovered_and_leaves_sheet() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message(
                "m1",
                10,
                vec![Attachment::inline("mantis.csv", "text/csv", vec![0xffu8, 0xfe])],
            )],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        assert!(routine.run().await.is_err());
        assert!(sheets.operations(SHEET).await.is_empty());
    }

    #[tokio::test]
    async fn test_empty_csv_clears_sheet() {
        let sheets = prefilled_sheets();
        let mail = InMemoryMailStore::new().with_thread(
            "t1",
            vec![message("m1", 10, vec![csv("mantis.csv", "")])],
        );
        let routine = routine(ImportConfig::named("mantis"), mail, &sheets);

        let outcome = routine.run().await.unwrap();

        assert_eq!(outcome, RoutineOutcome::Imported { rows: 0, columns: 0 });
        assert!(sheets.snapshot(SHEET).await.unwrap().is_empty());
        assert_eq!(sheets.operations(SHEET).await, vec![SheetOperation::Clear]);
    }

    #[tokio::test]
    async fn test_missing_sheet_is_an_error() {
        let sheets = Arc::new(InMemorySheetStore::new("spreadsheet").with_sheet("OTHER"));
        let routine = routine(ImportConfig::named("mantis"), InMemoryMailStore::new(), &sheets);

        let report = routine.run().await.unwrap_err();

        assert!(report
            .frames()
            .filter_map(|frame| frame.downcast_ref::<SheetStoreError>())
            .any(|err| matches!(err, SheetStoreError::SheetNotFound(_))));
        assert!(sheets.operations("OTHER").await.is_empty());
    }
}
