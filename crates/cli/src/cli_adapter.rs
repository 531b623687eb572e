use mail_csv_import_core::adapters::memory::{InMemoryMailSender, InMemorySheetStore};
use mail_csv_import_core::domain::RoutineOutcome;
use mail_csv_import_core::ports::application_service::ApplicationService;
use mail_csv_import_core::ports::command_handler::{
    Command, CommandError, CommandHandler, CommandReport,
};
use std::sync::Arc;
use tracing::instrument;

pub const USAGE: &str = "\
Usage: mail-csv-import [--config <path>] [COMMAND]

Commands:
  run [--sequential] [--dry-run]   Run every configured routine (default)
  run-routine <name> [--dry-run]   Run a single routine
  list                             List configured routines";

/// Parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<String>,
    pub dry_run: bool,
    pub command: Command,
}

pub fn parse_args(args: &[String]) -> Result<Invocation, CommandError> {
    let mut config_path = None;
    let mut dry_run = false;
    let mut sequential = false;
    let mut positional = Vec::new();

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" => {
                let path = iter.next().ok_or_else(|| CommandError::InvalidCommand {
                    details: "--config requires a path".to_string(),
                })?;
                config_path = Some(path.clone());
            }
            "--dry-run" => dry_run = true,
            "--sequential" => sequential = true,
            flag if flag.starts_with("--") => {
                return Err(CommandError::InvalidCommand {
                    details: format!("Unknown flag {}", flag),
                })
            }
            _ => positional.push(arg.clone()),
        }
    }

    let command = match positional.first().map(|s| s.as_str()) {
        None | Some("run") => Command::RunRoutines {
            parallel: !sequential,
        },
        Some("run-routine") => {
            let name = positional
                .get(1)
                .ok_or_else(|| CommandError::InvalidCommand {
                    details: "Routine name required".to_string(),
                })?
                .clone();
            Command::RunSpecificRoutine { name }
        }
        Some("list") => Command::ListRoutines,
        Some(other) => {
            return Err(CommandError::InvalidCommand {
                details: format!("Unknown command {}", other),
            })
        }
    };

    Ok(Invocation {
        config_path,
        dry_run,
        command,
    })
}

fn outcome_line(name: &str, outcome: &RoutineOutcome) -> String {
    if outcome.is_complete() {
        format!("✅ {}: {}", name, outcome)
    } else {
        format!("⚠️  {}: {}", name, outcome)
    }
}

pub struct CliAdapter {
    application_service: Arc<dyn ApplicationService>,
    dry_run_sheets: Option<(Arc<InMemorySheetStore>, Vec<String>)>,
    dry_run_mail: Option<Arc<InMemoryMailSender>>,
}

impl std::fmt::Debug for CliAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliAdapter")
            .field("application_service", &"<ApplicationService>")
            .field(
                "dry_run",
                &(self.dry_run_sheets.is_some() || self.dry_run_mail.is_some()),
            )
            .finish()
    }
}

impl CliAdapter {
    pub fn new(application_service: Arc<dyn ApplicationService>) -> Self {
        Self {
            application_service,
            dry_run_sheets: None,
            dry_run_mail: None,
        }
    }

    /// Prints the given in-memory sheets after each command instead of
    /// touching a real spreadsheet.
    pub fn with_dry_run_sheets(
        mut self,
        sheets: Arc<InMemorySheetStore>,
        sheet_names: Vec<String>,
    ) -> Self {
        self.dry_run_sheets = Some((sheets, sheet_names));
        self
    }

    /// Lists the mail held back by the given sender after each command.
    pub fn with_dry_run_mail(mut self, sender: Arc<InMemoryMailSender>) -> Self {
        self.dry_run_mail = Some(sender);
        self
    }

    async fn render_dry_run(&self, output: &mut String) {
        if let Some(sender) = &self.dry_run_mail {
            for mail in sender.sent().await {
                output.push_str(&format!(
                    "\n[dry run] mail '{}' to {}: {} ({} bytes)\n",
                    mail.subject,
                    mail.to,
                    mail.attachment_name,
                    mail.attachment.len()
                ));
            }
        }

        let Some((sheets, sheet_names)) = &self.dry_run_sheets else {
            return;
        };

        for title in sheet_names {
            let Some(table) = sheets.snapshot(title).await else {
                continue;
            };
            output.push_str(&format!("\n[dry run] sheet '{}':\n", title));
            for row in table.rows() {
                output.push_str(&row.join(" | "));
                output.push('\n');
            }
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for CliAdapter {
    #[instrument]
    async fn handle(&self, command: Command) -> error_stack::Result<CommandReport, CommandError> {
        let mut report = match command {
            Command::RunRoutines { parallel } => {
                let results = self.application_service.run_all_routines(parallel).await;

                let mut success_count = 0;
                let mut failure_count = 0;
                let mut output = "\nRoutine Results:\n".to_string();

                for (name, result) in &results {
                    match result {
                        Ok(outcome) => {
                            success_count += 1;
                            output.push_str(&outcome_line(name, outcome));
                        }
                        Err(error) => {
                            failure_count += 1;
                            output.push_str(&format!("❌ {}: {:?}", name, error));
                        }
                    }
                    output.push('\n');
                }

                output.push_str(&format!(
                    "\nSummary: {} successful, {} failed",
                    success_count, failure_count
                ));

                CommandReport {
                    output,
                    success: failure_count == 0,
                }
            }
            Command::RunSpecificRoutine { name } => {
                match self.application_service.run_routine_by_name(&name).await {
                    Ok(outcome) => CommandReport {
                        output: outcome_line(&name, &outcome),
                        success: true,
                    },
                    Err(error) => CommandReport {
                        output: format!("❌ {}: {:?}", name, error),
                        success: false,
                    },
                }
            }
            Command::ListRoutines => {
                let routines = self.application_service.list_available_routines();
                CommandReport {
                    output: format!("Available routines:\n{}", routines.join("\n")),
                    success: true,
                }
            }
        };

        self.render_dry_run(&mut report.output).await;
        Ok(report)
    }
}
