use serde::{Deserialize, Serialize};

use crate::types::{ExecutionOutcome, Phase, Termination};

/// Why an execution did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    Timeout,
    ToolchainUnavailable,
    RuntimeOrCompileError,
}

impl FailureCategory {
    /// Failures that point at the host rather than the submitted program.
    pub fn is_internal(&self) -> bool {
        matches!(self, FailureCategory::ToolchainUnavailable)
    }
}

/// Caller-facing shape of an execution.
///
/// Serializes to `{stdout, stderr}` on success and
/// `{error, category, stdout, stderr}` on failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExecutionReport {
    Failure {
        error: String,
        category: FailureCategory,
        stdout: String,
        stderr: String,
    },
    Success {
        stdout: String,
        stderr: String,
    },
}

impl ExecutionReport {
    pub fn is_ok(&self) -> bool {
        matches!(self, ExecutionReport::Success { .. })
    }

    pub fn category(&self) -> Option<FailureCategory> {
        match self {
            ExecutionReport::Failure { category, .. } => Some(*category),
            ExecutionReport::Success { .. } => None,
        }
    }

    pub fn stdout(&self) -> &str {
        match self {
            ExecutionReport::Failure { stdout, .. } | ExecutionReport::Success { stdout, .. } => {
                stdout
            }
        }
    }

    pub fn stderr(&self) -> &str {
        match self {
            ExecutionReport::Failure { stderr, .. } | ExecutionReport::Success { stderr, .. } => {
                stderr
            }
        }
    }
}

/// Map an engine outcome to the caller-facing report. Partial output is kept on every failure.
pub fn classify(outcome: &ExecutionOutcome) -> ExecutionReport {
    let stdout = outcome.stdout.text();
    let stderr = outcome.stderr.text();

    let (category, error) = match outcome.termination {
        Termination::CompletedNormally => return ExecutionReport::Success { stdout, stderr },
        Termination::TimedOut => (
            FailureCategory::Timeout,
            format!(
                "{} timed out after {} ms",
                phase_label(outcome.phase),
                outcome.budget.as_millis()
            ),
        ),
        Termination::FailedToStart => (
            FailureCategory::ToolchainUnavailable,
            format!("Toolchain unavailable: {}", stderr.trim_end()),
        ),
        Termination::CompletedWithErrorExit => {
            let status = outcome
                .exit
                .map(|exit| exit.to_string())
                .unwrap_or_else(|| "unknown status".to_string());
            let error = match outcome.phase {
                Phase::Build => format!("Compilation failed with {}", status),
                Phase::Run => format!("Process exited with {}", status),
            };
            (FailureCategory::RuntimeOrCompileError, error)
        }
    };

    ExecutionReport::Failure {
        error,
        category,
        stdout,
        stderr,
    }
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Build => "Compilation",
        Phase::Run => "Execution",
    }
}
