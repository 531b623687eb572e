use crate::{domain::RoutineOutcome, ports::routine::RoutineError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplicationServiceError {
    #[error("Routine '{name}' not found")]
    RoutineNotFound { name: String },
    #[error("Routine execution failed: {details}")]
    RoutineExecutionFailed { details: String },
}

pub type RoutineResult = error_stack::Result<RoutineOutcome, RoutineError>;

#[async_trait::async_trait]
pub trait ApplicationService: Send + Sync {
    /// Runs every configured routine. Results keep the configuration order.
    async fn run_all_routines(&self, parallel: bool) -> Vec<(String, RoutineResult)>;

    async fn run_routine_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<RoutineOutcome, ApplicationServiceError>;

    fn list_available_routines(&self) -> Vec<String>;
}
