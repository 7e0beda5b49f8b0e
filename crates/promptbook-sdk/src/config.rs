//! SDK configuration
//!
//! Loaded from an optional `config/promptbook` file (any format the `config`
//! crate understands) and `PROMPTBOOK_*` environment variables, or from a
//! single YAML file.

use crate::error::Result;
use anyhow::Context;
use promptbook_compiler::CompilerOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up by [`SdkConfig::load`], without extension
pub const DEFAULT_CONFIG_FILE: &str = "config/promptbook";

/// Prefix of the environment variables read by [`SdkConfig::load`]
pub const ENV_PREFIX: &str = "PROMPTBOOK";

/// Book given inline instead of as a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookContent {
    /// Name used in error messages
    pub name: String,
    pub content: String,
}

/// Main SDK configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SdkConfig {
    /// Book file paths
    pub book_files: Vec<PathBuf>,

    /// Inline books, alternative to file paths
    pub book_contents: Vec<BookContent>,

    /// Default filter used when `RUST_LOG` is not set
    pub log_level: String,

    /// Install a tracing subscriber in [`init_tracing`](crate::init_tracing)
    pub enable_tracing: bool,

    /// Compiler options
    pub compiler: CompilerOptions,
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            book_files: Vec::new(),
            book_contents: Vec::new(),
            log_level: "info".to_string(),
            enable_tracing: true,
            compiler: CompilerOptions::default(),
        }
    }
}

impl SdkConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from `.env`, environment variables and the default config file
    ///
    /// Nested compiler options use a double underscore, for example
    /// `PROMPTBOOK_COMPILER__ENABLE_LOGIC_VALIDATION=false`.
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if exists
        dotenvy::dotenv().ok();

        Self::load_from(DEFAULT_CONFIG_FILE)
            .with_context(|| format!("Failed to load configuration from {}", DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from an optional config file and environment variables
    pub fn load_from(config_file: &str) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(config_file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(
            "Loaded configuration with {} book files and {} inline books",
            loaded.book_files.len(),
            loaded.book_contents.len()
        );
        Ok(loaded)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Add a book file
    pub fn with_book_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.book_files.push(path.into());
        self
    }

    /// Add an inline book
    pub fn with_book_content(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.book_contents.push(BookContent {
            name: name.into(),
            content: content.into(),
        });
        self
    }

    /// Set the default log filter
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Enable tracing
    pub fn enable_tracing(mut self, enable: bool) -> Self {
        self.enable_tracing = enable;
        self
    }

    /// Set compiler options
    pub fn with_compiler_options(mut self, options: CompilerOptions) -> Self {
        self.compiler = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sdk_config_default() {
        let config = SdkConfig::default();

        assert!(config.book_files.is_empty());
        assert!(config.book_contents.is_empty());
        assert_eq!(config.log_level, "info");
        assert!(config.enable_tracing);
        assert_eq!(config.compiler, CompilerOptions::default());
    }

    #[test]
    fn test_sdk_config_builder_methods() {
        let config = SdkConfig::new()
            .with_book_file("books/a.book")
            .with_book_content("inline", "# Inline")
            .with_log_level("debug")
            .enable_tracing(false);

        assert_eq!(config.book_files, vec![PathBuf::from("books/a.book")]);
        assert_eq!(config.book_contents[0].name, "inline");
        assert_eq!(config.log_level, "debug");
        assert!(!config.enable_tracing);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: SdkConfig = serde_yaml::from_str(
            "log_level: warn\ncompiler:\n  enable_logic_validation: false\n",
        )
        .unwrap();

        assert_eq!(config.log_level, "warn");
        assert!(config.enable_tracing);
        assert!(!config.compiler.enable_logic_validation);
        assert!(config.compiler.enable_high_level_abstractions);
        assert_eq!(config.compiler.max_script_identifiers, 256);
    }

    #[test]
    fn test_missing_yaml_file() {
        let result = SdkConfig::from_yaml_file("does/not/exist.yaml");
        assert!(matches!(result, Err(crate::SdkError::IoError(_))));
    }
}
