//! Language profile registry
//!
//! One static table describes how every supported language is built and run.
//! Adding a language means adding a row to [`PROFILES`] and a variant to
//! [`Language`]; nothing else in the crate branches on the language.

use std::path::{Path, PathBuf};
use which::which;

use crate::types::Language;

/// One argument of a command template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Literal(&'static str),
    /// Absolute path of the workspace source file
    Source,
    /// Absolute path of the compiled artifact
    Artifact,
}

/// Program plus argument shape, expanded against concrete paths at execution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTemplate {
    pub program: Arg,
    pub args: &'static [Arg],
}

/// A command with every placeholder substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub program: PathBuf,
    pub args: Vec<PathBuf>,
}

impl ResolvedCommand {
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(self.args.iter())
            .map(|part| part.display().to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl CommandTemplate {
    pub fn resolve(&self, source: &Path, artifact: &Path) -> ResolvedCommand {
        let expand = |arg: &Arg| match arg {
            Arg::Literal(value) => PathBuf::from(*value),
            Arg::Source => source.to_path_buf(),
            Arg::Artifact => artifact.to_path_buf(),
        };
        ResolvedCommand {
            program: expand(&self.program),
            args: self.args.iter().map(expand).collect(),
        }
    }
}

/// Toolchain behavior for one language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageProfile {
    pub language: Language,
    /// Extension of the generated source file, without the dot
    pub extension: &'static str,
    /// Present only for compiled languages
    pub build: Option<CommandTemplate>,
    pub run: CommandTemplate,
    /// Binaries that must be on `PATH` for this language to work
    pub required_tools: &'static [&'static str],
}

impl LanguageProfile {
    pub fn has_build_step(&self) -> bool {
        self.build.is_some()
    }

    pub fn source_file_name(&self) -> String {
        format!("{}.{}", SOURCE_STEM, self.extension)
    }

    /// The artifact sits next to the source, named by the source stem.
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        source.with_extension("")
    }

    pub fn build_command(&self, source: &Path) -> Option<ResolvedCommand> {
        self.build
            .map(|template| template.resolve(source, &self.artifact_path(source)))
    }

    pub fn run_command(&self, source: &Path) -> ResolvedCommand {
        self.run.resolve(source, &self.artifact_path(source))
    }

    pub fn missing_tools(&self) -> Vec<&'static str> {
        self.required_tools
            .iter()
            .copied()
            .filter(|tool| which(tool).is_err())
            .collect()
    }

    pub fn is_available(&self) -> bool {
        self.missing_tools().is_empty()
    }
}

const SOURCE_STEM: &str = "code";

use Arg::{Artifact, Literal, Source};

pub static PROFILES: [LanguageProfile; 7] = [
    LanguageProfile {
        language: Language::Python,
        extension: "py",
        build: None,
        run: CommandTemplate {
            program: Literal("python3"),
            args: &[Source],
        },
        required_tools: &["python3"],
    },
    LanguageProfile {
        language: Language::JavaScript,
        extension: "js",
        build: None,
        run: CommandTemplate {
            program: Literal("node"),
            args: &[Source],
        },
        required_tools: &["node"],
    },
    LanguageProfile {
        language: Language::TypeScript,
        extension: "ts",
        build: None,
        run: CommandTemplate {
            program: Literal("npx"),
            args: &[Literal("ts-node"), Source],
        },
        required_tools: &["npx", "ts-node"],
    },
    LanguageProfile {
        language: Language::Go,
        extension: "go",
        build: None,
        run: CommandTemplate {
            program: Literal("go"),
            args: &[Literal("run"), Source],
        },
        required_tools: &["go"],
    },
    LanguageProfile {
        language: Language::Php,
        extension: "php",
        build: None,
        run: CommandTemplate {
            program: Literal("php"),
            args: &[Source],
        },
        required_tools: &["php"],
    },
    LanguageProfile {
        language: Language::Rust,
        extension: "rs",
        build: Some(CommandTemplate {
            program: Literal("rustc"),
            args: &[Source, Literal("-o"), Artifact],
        }),
        run: CommandTemplate {
            program: Artifact,
            args: &[],
        },
        required_tools: &["rustc"],
    },
    LanguageProfile {
        language: Language::Cpp,
        extension: "cpp",
        build: Some(CommandTemplate {
            program: Literal("g++"),
            args: &[Source, Literal("-o"), Artifact],
        }),
        run: CommandTemplate {
            program: Artifact,
            args: &[],
        },
        required_tools: &["g++"],
    },
];

/// Look up a profile by its wire identifier.
pub fn lookup(id: &str) -> Option<&'static LanguageProfile> {
    id.parse::<Language>().ok().map(profile)
}

/// Rows of [`PROFILES`] are in declaration order of [`Language`].
pub fn profile(language: Language) -> &'static LanguageProfile {
    let index = match language {
        Language::Python => 0,
        Language::JavaScript => 1,
        Language::TypeScript => 2,
        Language::Go => 3,
        Language::Php => 4,
        Language::Rust => 5,
        Language::Cpp => 6,
    };
    &PROFILES[index]
}
