use tokio::time::{Duration, Instant};
use tracing::{debug, info};

use crate::{
    config::EngineConfig,
    languages::LanguageProfile,
    sandbox,
    types::{ExecutionOutcome, Phase, Termination},
    workspace::Workspace,
};

/// Limits applied to one execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Shared budget for build and run
    pub timeout: Duration,
    /// Cap per captured stream
    pub max_output_bytes: usize,
}

impl From<&EngineConfig> for ExecutionLimits {
    fn from(config: &EngineConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_output_bytes: config.max_output_bytes,
        }
    }
}

/// Drives the optional build step and the run step for a prepared workspace
#[derive(Debug, Clone)]
pub struct CodeExecutor {
    limits: ExecutionLimits,
}

impl CodeExecutor {
    pub fn new(limits: ExecutionLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ExecutionLimits {
        self.limits
    }

    /// Build (if the language needs it) and run the workspace source.
    ///
    /// One deadline covers both phases. A build that does not complete
    /// normally ends the execution; the run step is never attempted.
    pub async fn run(
        &self,
        profile: &LanguageProfile,
        workspace: &mut Workspace,
        input: Option<&str>,
    ) -> ExecutionOutcome {
        let deadline = Instant::now() + self.limits.timeout;
        let source = workspace.source_file().to_path_buf();

        if let Some(build) = profile.build_command(&source) {
            let outcome = sandbox::run_process(
                &build,
                workspace.root_dir(),
                None,
                deadline,
                self.limits,
                Phase::Build,
            )
            .await;

            if outcome.termination != Termination::CompletedNormally {
                info!(
                    "Build for {} ended with {:?}, skipping run",
                    profile.language, outcome.termination
                );
                return outcome;
            }
            workspace.set_artifact(profile.artifact_path(&source));
            debug!("Build finished in {:?}", outcome.duration);
        }

        let run = profile.run_command(&source);
        sandbox::run_process(
            &run,
            workspace.root_dir(),
            input,
            deadline,
            self.limits,
            Phase::Run,
        )
        .await
    }
}
