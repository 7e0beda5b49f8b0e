//! Unit tests for the SDK
//!
//! Tests configuration loading and building book libraries from files and
//! inline content.

use promptbook_core::ParameterRole;
use promptbook_sdk::*;
use std::fs;
use tempfile::TempDir;

const GREETING_BOOK: &str = r#"# Greeting

- URL https://example.com/greeting.book
- INPUT PARAMETER {name} Name of the person
- OUTPUT PARAMETER {greeting} Greeting

## Greet

Say hi to {name}

-> {greeting}
"#;

const FAREWELL_BOOK: &str = "# Farewell\n\n## Say goodbye\n\nSay goodbye to {name}\n\n-> {farewell}\n";

const CIRCULAR_BOOK: &str = "# Circle\n\n## One\n\nUse {b}\n\n-> {a}\n\n## Two\n\nUse {a}\n\n-> {b}\n";

fn write_book(dir: &TempDir, file_name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(file_name);
    fs::write(&path, content).unwrap();
    path
}

// =============================================================================
// Library Tests
// =============================================================================

#[test]
fn test_library_from_files_and_content() {
    let dir = TempDir::new().unwrap();
    let path = write_book(&dir, "greeting.book.md", GREETING_BOOK);

    let result = BookLibraryBuilder::new()
        .add_book_file(&path)
        .add_book_content("farewell", FAREWELL_BOOK)
        .build();
    assert!(result.is_ok(), "Failed to build library: {:?}", result.err());

    let library = result.unwrap();
    assert_eq!(library.len(), 2);

    let greeting = library.get("https://example.com/greeting.book").unwrap();
    assert_eq!(greeting.title, "Greeting");
    assert_eq!(
        greeting.sources[0].path.as_deref(),
        Some(path.display().to_string().as_str())
    );
    assert_eq!(greeting.sources[0].content, GREETING_BOOK);

    let farewell = library.get("Farewell").unwrap();
    assert!(farewell.pipeline_url.is_none());
    assert!(farewell.sources[0].path.is_none());
    assert_eq!(
        farewell.parameter("name").map(|p| p.role),
        Some(ParameterRole::Input)
    );
}

#[test]
fn test_library_reports_failing_book() {
    let result = BookLibraryBuilder::new()
        .add_book_content("circle", CIRCULAR_BOOK)
        .build();

    let error = result.unwrap_err();
    assert!(matches!(error, SdkError::BookError { .. }));
    assert!(error.to_string().contains("circle"), "{}", error);
    assert!(error.to_string().contains("circular"), "{}", error);
}

#[test]
fn test_library_without_validation() {
    let result = BookLibraryBuilder::new()
        .add_book_content("circle", CIRCULAR_BOOK)
        .with_compiler_options(CompilerOptions {
            enable_logic_validation: false,
            ..CompilerOptions::default()
        })
        .build();
    assert!(result.is_ok(), "Failed to build library: {:?}", result.err());
    assert_eq!(result.unwrap().get("Circle").map(|p| p.tasks.len()), Some(2));
}

#[test]
fn test_library_rejects_shared_url() {
    let result = BookLibraryBuilder::new()
        .add_book_content("first", GREETING_BOOK)
        .add_book_content("second", GREETING_BOOK.replace("# Greeting", "# Hello"))
        .build();

    assert!(matches!(
        result,
        Err(SdkError::DuplicatePipelineUrl { .. })
    ));
}

#[test]
fn test_library_serves_json_and_book() {
    let library = BookLibraryBuilder::new()
        .add_book_content("greeting", GREETING_BOOK)
        .build()
        .unwrap();

    let json = library.to_json("Greeting").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["pipelineUrl"], "https://example.com/greeting.book");

    let book = pipeline_to_book(library.get("Greeting").unwrap());
    assert!(book.contains("- INPUT PARAMETER {name} Name of the person"), "{}", book);
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_from_yaml_file() {
    let dir = TempDir::new().unwrap();
    let book_path = write_book(&dir, "greeting.book.md", GREETING_BOOK);
    let config_path = dir.path().join("promptbook.yaml");
    fs::write(
        &config_path,
        format!(
            "book_files:\n  - {}\nbook_contents:\n  - name: farewell\n    content: \"# Farewell\\n\\n## Bye\\n\\nBye {{name}}\\n\\n-> {{bye}}\"\nlog_level: debug\nenable_tracing: false\n",
            book_path.display()
        ),
    )
    .unwrap();

    let result = SdkConfig::from_yaml_file(&config_path);
    assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

    let config = result.unwrap();
    assert_eq!(config.book_files, vec![book_path]);
    assert_eq!(config.log_level, "debug");
    assert!(!config.enable_tracing);
    assert!(init_tracing(&config).is_ok());

    let library = BookLibraryBuilder::from_config(&config).build().unwrap();
    assert_eq!(library.len(), 2);
    assert!(library.get("Farewell").is_some());
}

#[test]
fn test_config_load_from_file() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("promptbook.yaml");
    fs::write(
        &config_path,
        "log_level: trace\ncompiler:\n  max_script_identifiers: 16\n",
    )
    .unwrap();

    let result = SdkConfig::load_from(&config_path.display().to_string());
    assert!(result.is_ok(), "Failed to load config: {:?}", result.err());

    let config = result.unwrap();
    assert_eq!(config.log_level, "trace");
    assert_eq!(config.compiler.max_script_identifiers, 16);
    assert!(config.compiler.enable_high_level_abstractions);
}

#[test]
fn test_malformed_yaml_config() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("broken.yaml");
    fs::write(&config_path, "log_level: [unclosed\n").unwrap();

    let result = SdkConfig::from_yaml_file(&config_path);
    assert!(matches!(result, Err(SdkError::YamlError(_))));
}
