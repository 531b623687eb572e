use crate::domain::RoutineOutcome;
use crate::ports::application_service::{
    ApplicationService, ApplicationServiceError, RoutineResult,
};
use crate::ports::routine::Routine;
use error_stack::{report, ResultExt};
use futures::future::join_all;
use tracing::{error, info, instrument, Instrument};

pub struct MailCsvImportApplicationService {
    routines: Vec<Box<dyn Routine>>,
}

impl MailCsvImportApplicationService {
    pub fn new(routines: Vec<Box<dyn Routine>>) -> Self {
        Self { routines }
    }
}

fn log_result(name: &str, result: &RoutineResult) {
    match result {
        Ok(outcome) => info!("✅ {}: {}", name, outcome),
        Err(report) => error!("❌ {}: {:?}", name, report),
    }
}

#[async_trait::async_trait]
impl ApplicationService for MailCsvImportApplicationService {
    #[instrument(skip(self))]
    async fn run_all_routines(&self, parallel: bool) -> Vec<(String, RoutineResult)> {
        let len = self.routines.len();
        let span_for = |index: usize, routine: &dyn Routine| {
            tracing::span!(
                tracing::Level::INFO,
                "routine",
                routine = routine.name(),
                index = index,
                len = len
            )
        };

        let results = if parallel {
            info!("Running {} routines in parallel", len);

            let futures: Vec<_> = self
                .routines
                .iter()
                .enumerate()
                .map(|(index, routine)| routine.run().instrument(span_for(index, routine.as_ref())))
                .collect();

            join_all(futures).await
        } else {
            info!("Running {} routines sequentially", len);

            let mut results = Vec::with_capacity(len);
            for (index, routine) in self.routines.iter().enumerate() {
                let result = routine
                    .run()
                    .instrument(span_for(index, routine.as_ref()))
                    .await;
                log_result(routine.name(), &result);
                results.push(result);
            }
            results
        };

        let named: Vec<(String, RoutineResult)> = self
            .routines
            .iter()
            .map(|routine| routine.name().to_string())
            .zip(results)
            .collect();

        if parallel {
            for (name, result) in &named {
                log_result(name, result);
            }
        }

        named
    }

    #[instrument(skip(self))]
    async fn run_routine_by_name(
        &self,
        name: &str,
    ) -> error_stack::Result<RoutineOutcome, ApplicationServiceError> {
        let routine = self
            .routines
            .iter()
            .find(|routine| routine.name() == name)
            .ok_or_else(|| {
                report!(ApplicationServiceError::RoutineNotFound {
                    name: name.to_string()
                })
            })?;

        let result = routine.run().await;
        log_result(name, &result);

        result.change_context(ApplicationServiceError::RoutineExecutionFailed {
            details: name.to_string(),
        })
    }

    fn list_available_routines(&self) -> Vec<String> {
        self.routines
            .iter()
            .map(|routine| routine.name().to_string())
            .collect()
    }
}
