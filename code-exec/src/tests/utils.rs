pub mod defaults {
    use crate::EngineConfig;
    use std::path::Path;

    pub fn test_config(workspace_root: &Path) -> EngineConfig {
        EngineConfig {
            timeout_ms: 5_000,
            max_output_bytes: 1024 * 1024,
            workspace_root: workspace_root.to_path_buf(),
            max_concurrent_executions: 4,
        }
    }

    /// Compilers and `go run` need more than the default budget on a cold cache.
    pub fn extended_config(workspace_root: &Path) -> EngineConfig {
        EngineConfig {
            timeout_ms: 60_000,
            ..test_config(workspace_root)
        }
    }
}

/// Profiles backed by POSIX `sh`, so engine behavior can be exercised on any Unix host.
/// They borrow a registered `Language` only because the field is required.
pub mod profiles {
    use crate::languages::{Arg, CommandTemplate, LanguageProfile};
    use crate::Language;

    pub static SHELL: LanguageProfile = LanguageProfile {
        language: Language::Python,
        extension: "sh",
        build: None,
        run: CommandTemplate {
            program: Arg::Literal("sh"),
            args: &[Arg::Source],
        },
        required_tools: &["sh"],
    };

    /// Syntax-checks the script, then "links" it by copying it to the artifact path.
    pub static COMPILED_SHELL: LanguageProfile = LanguageProfile {
        language: Language::Cpp,
        extension: "sh",
        build: Some(CommandTemplate {
            program: Arg::Literal("sh"),
            args: &[
                Arg::Literal("-c"),
                Arg::Literal(r#"sh -n "$0" && cp "$0" "$1" && chmod +x "$1""#),
                Arg::Source,
                Arg::Artifact,
            ],
        }),
        run: CommandTemplate {
            program: Arg::Artifact,
            args: &[],
        },
        required_tools: &["sh", "cp", "chmod"],
    };

    pub static SLOW_BUILD: LanguageProfile = LanguageProfile {
        language: Language::Rust,
        extension: "sh",
        build: Some(CommandTemplate {
            program: Arg::Literal("sh"),
            args: &[Arg::Literal("-c"), Arg::Literal("sleep 30")],
        }),
        run: CommandTemplate {
            program: Arg::Artifact,
            args: &[],
        },
        required_tools: &["sh", "sleep"],
    };

    pub static MISSING_TOOLCHAIN: LanguageProfile = LanguageProfile {
        language: Language::Php,
        extension: "txt",
        build: None,
        run: CommandTemplate {
            program: Arg::Literal("no-such-interpreter-7c1e"),
            args: &[Arg::Source],
        },
        required_tools: &["no-such-interpreter-7c1e"],
    };
}

pub mod fs {
    use std::path::{Path, PathBuf};

    pub fn entries(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect()
    }
}

pub mod toolchains {
    use crate::{languages, Language};

    /// Tests for real languages are skipped on hosts without the toolchain.
    pub fn available(language: Language) -> bool {
        let missing = languages::profile(language).missing_tools();
        if !missing.is_empty() {
            eprintln!("skipping {} test, missing: {}", language, missing.join(", "));
        }
        missing.is_empty()
    }
}

#[cfg(target_os = "linux")]
pub mod procs {
    use std::time::Duration;

    /// A zombie awaiting its reaper counts as dead.
    pub fn is_running(pid: u32) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            Ok(stat) => stat
                .rsplit_once(") ")
                .and_then(|(_, rest)| rest.chars().next())
                .map(|state| state != 'Z' && state != 'X')
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    pub async fn wait_until_gone(pid: u32, within: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + within;
        while tokio::time::Instant::now() < deadline {
            if !is_running(pid) {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        !is_running(pid)
    }
}
