use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {details}")]
    InvalidCommand { details: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RunRoutines { parallel: bool },
    RunSpecificRoutine { name: String },
    ListRoutines,
}

/// What a command produced: text for the user and whether every routine ended
/// in an outcome rather than an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReport {
    pub output: String,
    pub success: bool,
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<CommandReport, CommandError>;
}
