use super::{
    fixtures::{code_samples::*, test_scenarios::*},
    utils::{defaults::extended_config, fs::entries, toolchains},
};
use crate::{CodeExecutionService, ExecutionRequest, FailureCategory, Language, Result};
use assert_fs::TempDir;

async fn test_language_execution(language: Language, code: &str, expected: &str) -> Result<()> {
    if !toolchains::available(language) {
        return Ok(());
    }
    let root = TempDir::new().unwrap();
    let service = CodeExecutionService::new(extended_config(root.path()))?;

    let report = service
        .execute(ExecutionRequest::new(language.as_str(), code))
        .await?;
    assert!(report.is_ok(), "{} failed: {:?}", language, report);
    assert_eq!(report.stdout().trim(), expected);
    assert!(entries(root.path()).is_empty());
    Ok(())
}

async fn test_compile_error(language: Language, code: &str) -> Result<()> {
    if !toolchains::available(language) {
        return Ok(());
    }
    let root = TempDir::new().unwrap();
    let service = CodeExecutionService::new(extended_config(root.path()))?;

    let report = service
        .execute(ExecutionRequest::new(language.as_str(), code))
        .await?;
    assert_eq!(
        report.category(),
        Some(FailureCategory::RuntimeOrCompileError)
    );
    assert!(report.stdout().is_empty());
    assert!(!report.stderr().is_empty());
    assert!(entries(root.path()).is_empty());
    Ok(())
}

#[tokio::test]
async fn test_python_execution() -> Result<()> {
    test_language_execution(Language::Python, PYTHON_HELLO, "Hello from Python!").await
}

#[tokio::test]
async fn test_javascript_execution() -> Result<()> {
    test_language_execution(Language::JavaScript, JS_HELLO, "Hello from JavaScript!").await
}

#[tokio::test]
async fn test_typescript_execution() -> Result<()> {
    test_language_execution(Language::TypeScript, TS_HELLO, "Hello from TypeScript!").await
}

#[tokio::test]
async fn test_go_execution() -> Result<()> {
    test_language_execution(Language::Go, GO_HELLO, "Hello from Go!").await
}

#[tokio::test]
async fn test_php_execution() -> Result<()> {
    test_language_execution(Language::Php, PHP_HELLO, "Hello from PHP!").await
}

#[tokio::test]
async fn test_rust_execution() -> Result<()> {
    test_language_execution(Language::Rust, RUST_HELLO, "Hello from Rust!").await
}

#[tokio::test]
async fn test_cpp_execution() -> Result<()> {
    test_language_execution(Language::Cpp, CPP_HELLO, "Hello from C++!").await
}

#[tokio::test]
async fn test_rust_compile_error() -> Result<()> {
    test_compile_error(Language::Rust, RUST_COMPILE_ERROR).await
}

#[tokio::test]
async fn test_cpp_compile_error() -> Result<()> {
    test_compile_error(Language::Cpp, CPP_COMPILE_ERROR).await
}

#[tokio::test]
async fn test_cpp_reads_input() -> Result<()> {
    if !toolchains::available(Language::Cpp) {
        return Ok(());
    }
    let root = TempDir::new().unwrap();
    let service = CodeExecutionService::new(extended_config(root.path()))?;

    let report = service
        .execute(ExecutionRequest::new("cpp", CPP_ECHO).with_input("hello\n"))
        .await?;
    assert!(report.is_ok());
    assert!(report.stdout().contains("hello"));
    Ok(())
}
