use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};

use crate::{
    config::EngineConfig,
    error::Error,
    executor::{CodeExecutor, ExecutionLimits},
    report::{classify, ExecutionReport},
    types::ExecutionRequest,
    validate::validate,
    workspace::Workspace,
};

#[derive(Clone)]
pub struct CodeExecutionService {
    config: Arc<EngineConfig>,
    executor: Arc<CodeExecutor>,
    semaphore: Arc<Semaphore>,
}

impl CodeExecutionService {
    pub fn new(config: EngineConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            executor: Arc::new(CodeExecutor::new(ExecutionLimits::from(&config))),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_executions)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate, acquire a workspace, build/run, classify, release.
    ///
    /// `Err` is reserved for bad requests and environment faults; a program
    /// that fails, times out, or cannot be started is an `Ok` failure report.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ExecutionReport, Error> {
        let submission = validate(request)?;
        let language = submission.profile.language;

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| Error::System(format!("Failed to acquire execution permit: {}", e)))?;

        debug!("Starting code execution for language: {}", language);

        let mut workspace = Workspace::acquire(&self.config.workspace_root, submission.profile)
            .await
            .inspect_err(|e| error!("Workspace setup failed: {}", e))?;
        workspace
            .write_source(&submission.code)
            .await
            .inspect_err(|e| error!("Workspace setup failed: {}", e))?;

        // The task owns the workspace and the permit. A caller that stops waiting
        // frees neither; both go when the run has finished and cleaned up.
        let executor = Arc::clone(&self.executor);
        let handle = tokio::spawn(async move {
            let outcome = executor
                .run(
                    submission.profile,
                    &mut workspace,
                    submission.input.as_deref(),
                )
                .await;
            workspace.release().await;
            drop(permit);
            outcome
        });

        let outcome = handle.await.map_err(|e| {
            error!("Execution task for {} failed: {}", language, e);
            Error::System(format!("Execution task failed: {}", e))
        })?;

        let report = classify(&outcome);
        match report.category() {
            None => info!(
                "Code execution completed successfully ({}, {:?})",
                language, outcome.duration
            ),
            Some(category) if category.is_internal() => {
                error!("Toolchain for {} unavailable: {}", language, report.stderr())
            }
            Some(category) => info!("User code for {} failed: {:?}", language, category),
        }

        Ok(report)
    }

    pub fn available_slots(&self) -> usize {
        self.semaphore.available_permits()
    }
}
