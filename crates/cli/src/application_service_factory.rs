use std::{collections::BTreeSet, sync::Arc};

use error_stack::ResultExt;
use mail_csv_import_core::{
    adapters::{
        config::app_config::AppConfig,
        gmail::{gmail_mail_sender::GmailMailSender, gmail_mail_store::GmailMailStore},
        mantis::mantis_csv_exporter::MantisCsvExporter,
        memory::{InMemoryMailSender, InMemorySheetStore},
        sheets::spreadsheet_manager::SpreadsheetManager,
    },
    application::{
        csv_export::csv_export_routine::CsvExportRoutine,
        csv_import::{csv_import_routine::CsvImportRoutine, destination_locks::DestinationLocks},
        service::MailCsvImportApplicationService,
    },
    ports::{
        application_service::ApplicationService, csv_export_source::CsvExportSource,
        mail_sender::MailSender, mail_store::MailStore, routine::Routine,
        sheet_store::SheetStore,
    },
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Failed to connect to the mailbox")]
    MailStore,
    #[error("Failed to open the spreadsheet")]
    SheetStore,
    #[error("Failed to connect the mail sender")]
    MailSender,
}

/// Everything the CLI needs to run commands.
pub struct ServiceBundle {
    pub service: Arc<dyn ApplicationService>,
    /// Set in dry-run mode: the sheets the imports wrote to instead of the
    /// real spreadsheet.
    pub dry_run_sheets: Option<Arc<InMemorySheetStore>>,
    /// Set in dry-run mode: the mail the exports would have sent.
    pub dry_run_mail: Option<Arc<InMemoryMailSender>>,
    pub sheet_names: Vec<String>,
}

pub struct ApplicationServiceFactory;

impl ApplicationServiceFactory {
    pub async fn create(
        config: &AppConfig,
        dry_run: bool,
    ) -> error_stack::Result<ServiceBundle, FactoryError> {
        let mail_store: Arc<dyn MailStore> = Arc::new(
            GmailMailStore::new(config.gmail.clone())
                .await
                .change_context(FactoryError::MailStore)?,
        );

        let sheet_names: Vec<String> = config
            .imports
            .iter()
            .map(|import| import.sheet_name.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let (sheet_store, dry_run_sheets): (Arc<dyn SheetStore>, _) = if dry_run {
            let store = Arc::new(
                sheet_names
                    .iter()
                    .fold(
                        InMemorySheetStore::new(config.sheets.spreadsheet_id.to_string()),
                        |store, title| store.with_sheet(title.clone()),
                    ),
            );
            (Arc::clone(&store) as Arc<dyn SheetStore>, Some(store))
        } else {
            let manager = SpreadsheetManager::new(config.sheets.clone())
                .await
                .change_context(FactoryError::SheetStore)?;
            (Arc::new(manager) as Arc<dyn SheetStore>, None)
        };

        let (mail_sender, dry_run_mail): (Arc<dyn MailSender>, _) = if dry_run {
            let sender = Arc::new(InMemoryMailSender::new());
            (Arc::clone(&sender) as Arc<dyn MailSender>, Some(sender))
        } else {
            let sender = GmailMailSender::new(config.gmail.clone())
                .await
                .change_context(FactoryError::MailSender)?;
            (Arc::new(sender) as Arc<dyn MailSender>, None)
        };

        let mut routines = Self::create_routines(config, mail_store, sheet_store);
        routines.extend(Self::create_export_routines(config, mail_sender));

        Ok(ServiceBundle {
            service: Arc::new(MailCsvImportApplicationService::new(routines)),
            dry_run_sheets,
            dry_run_mail,
            sheet_names,
        })
    }

    pub fn create_routines(
        config: &AppConfig,
        mail_store: Arc<dyn MailStore>,
        sheet_store: Arc<dyn SheetStore>,
    ) -> Vec<Box<dyn Routine>> {
        let locks = Arc::new(DestinationLocks::new());

        config
            .imports
            .iter()
            .map(|import| {
                Box::new(CsvImportRoutine::new(
                    import.clone(),
                    Arc::clone(&mail_store),
                    Arc::clone(&sheet_store),
                    Arc::clone(&locks),
                )) as Box<dyn Routine>
            })
            .collect()
    }

    pub fn create_export_routines(
        config: &AppConfig,
        mail_sender: Arc<dyn MailSender>,
    ) -> Vec<Box<dyn Routine>> {
        config
            .exports
            .iter()
            .map(|export| {
                let source: Arc<dyn CsvExportSource> =
                    Arc::new(MantisCsvExporter::new(export.mantis.clone()));
                Box::new(CsvExportRoutine::new(
                    export.clone(),
                    source,
                    Arc::clone(&mail_sender),
                )) as Box<dyn Routine>
            })
            .collect()
    }
}
