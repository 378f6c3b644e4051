use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Supported programming languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Go,
    Php,
    Rust,
    Cpp,
}

impl Language {
    pub const ALL: [Language; 7] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Go,
        Language::Php,
        Language::Rust,
        Language::Cpp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Go => "go",
            Language::Php => "php",
            Language::Rust => "rust",
            Language::Cpp => "cpp",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Language::ALL
            .into_iter()
            .find(|language| language.as_str() == s)
            .ok_or_else(|| format!("Unsupported language: {}", s))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Code execution request as it arrives from a caller. Every field is optional
/// on the wire so that validation, not deserialization, decides what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionRequest {
    /// Language identifier, e.g. `"python"`
    #[serde(default)]
    pub language: Option<String>,
    /// Source code to execute
    #[serde(default)]
    pub code: Option<String>,
    /// Data fed to the program's standard input
    #[serde(default)]
    pub input: Option<String>,
}

impl ExecutionRequest {
    pub fn new(language: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            language: Some(language.into()),
            code: Some(code.into()),
            input: None,
        }
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

/// Which step of an execution produced an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Build,
    Run,
}

/// How a child process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    CompletedNormally,
    CompletedWithErrorExit,
    TimedOut,
    FailedToStart,
}

/// Exit code or terminating signal of a process that was actually started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl fmt::Display for ExitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(code), _) => write!(f, "exit code {}", code),
            (None, Some(signal)) => write!(f, "signal {}", signal),
            (None, None) => f.write_str("unknown status"),
        }
    }
}

/// Bytes read from one output stream, bounded by the configured cap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    pub bytes: Vec<u8>,
    /// Set when the stream produced more than the cap and the rest was discarded
    pub truncated: bool,
}

impl Captured {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// Result of one execution attempt, before classification.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub phase: Phase,
    pub termination: Termination,
    pub exit: Option<ExitInfo>,
    pub stdout: Captured,
    pub stderr: Captured,
    /// How long this phase ran
    pub duration: Duration,
    /// Wall-clock limit the whole execution ran under
    pub budget: Duration,
}

impl ExecutionOutcome {
    pub(crate) fn failed_to_start(phase: Phase, budget: Duration, diagnostic: String) -> Self {
        Self {
            phase,
            termination: Termination::FailedToStart,
            exit: None,
            stdout: Captured::default(),
            stderr: Captured {
                bytes: diagnostic.into_bytes(),
                truncated: false,
            },
            duration: Duration::ZERO,
            budget,
        }
    }
}
