/// Terminal state of one routine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutineOutcome {
    Imported { rows: usize, columns: usize },
    /// No thread matched the search query. The diagnostic was written to A1.
    MailNotFound,
    /// A thread matched but its last message carries no CSV attachment. The
    /// diagnostic was written to A1.
    AttachmentNotFound,
    /// The exported CSV was mailed as an attachment.
    Mailed { bytes: usize },
    /// The export endpoint answered with something other than CSV. Nothing was
    /// sent.
    ExportNotCsv,
}

impl RoutineOutcome {
    /// Whether the routine did its work, as opposed to stopping on a
    /// recovered condition.
    pub fn is_complete(&self) -> bool {
        matches!(
            self,
            RoutineOutcome::Imported { .. } | RoutineOutcome::Mailed { .. }
        )
    }
}

impl std::fmt::Display for RoutineOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoutineOutcome::Imported { rows, columns } => {
                write!(f, "imported {} rows x {} columns", rows, columns)
            }
            RoutineOutcome::MailNotFound => write!(f, "no matching mail"),
            RoutineOutcome::AttachmentNotFound => write!(f, "no CSV attachment"),
            RoutineOutcome::Mailed { bytes } => write!(f, "mailed {} bytes of CSV", bytes),
            RoutineOutcome::ExportNotCsv => write!(f, "export response was not CSV"),
        }
    }
}
