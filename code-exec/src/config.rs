use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// Operational limits and locations for the execution engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wall-clock budget for build and run together (milliseconds)
    pub timeout_ms: u64,
    /// Maximum captured bytes per output stream
    pub max_output_bytes: usize,
    /// Directory under which per-request workspaces are created
    pub workspace_root: PathBuf,
    /// Maximum number of executions in flight at once
    pub max_concurrent_executions: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_output_bytes: 1024 * 1024, // 1MiB
            workspace_root: std::env::temp_dir(),
            max_concurrent_executions: 10,
        }
    }
}

impl EngineConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        let config: EngineConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.timeout_ms == 0 {
            return Err(Error::Config("timeout_ms must be greater than zero".into()));
        }
        if self.max_output_bytes == 0 {
            return Err(Error::Config(
                "max_output_bytes must be greater than zero".into(),
            ));
        }
        if self.max_concurrent_executions == 0 {
            return Err(Error::Config(
                "max_concurrent_executions must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
