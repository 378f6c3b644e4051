//! # Code Execution Engine
//!
//! Turns a (language, source, stdin) triple into a bounded, observable process
//! execution against the host toolchain, with a per-request workspace that is
//! always removed afterwards.

mod config;
mod error;
mod executor;
pub mod languages;
mod report;
mod sandbox;
mod service;
mod types;
mod validate;
mod workspace;

#[cfg(test)]
mod tests;

pub use config::EngineConfig;
pub use error::Error;
pub use executor::{CodeExecutor, ExecutionLimits};
pub use languages::LanguageProfile;
pub use report::{classify, ExecutionReport, FailureCategory};
pub use service::CodeExecutionService;
pub use types::{
    Captured, ExecutionOutcome, ExecutionRequest, ExitInfo, Language, Phase, Termination,
};
pub use validate::{validate, Submission};
pub use workspace::Workspace;

/// Result type for code execution operations
pub type Result<T> = std::result::Result<T, Error>;
