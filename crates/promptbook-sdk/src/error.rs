//! SDK error types

use promptbook_compiler::CompileError;
use promptbook_parser::ParseError;
use std::path::PathBuf;
use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration could not be read or deserialized
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    /// YAML configuration file is malformed
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Parser error
    #[error("Parser error: {0}")]
    ParseError(#[from] ParseError),

    /// Compiler error
    #[error("Compiler error: {0}")]
    CompileError(#[from] CompileError),

    /// Compiler error in a named book
    #[error("Failed to compile book {name}: {source}")]
    BookError {
        name: String,
        #[source]
        source: CompileError,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Book file could not be read
    #[error("Failed to read book file {}: {source}", .path.display())]
    BookFileError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two books share a pipeline URL
    #[error("Pipeline URL {url} is used by both \"{first}\" and \"{second}\"")]
    DuplicatePipelineUrl {
        url: String,
        first: String,
        second: String,
    },

    /// Tracing subscriber could not be installed
    #[error("Failed to initialize tracing: {0}")]
    TracingError(String),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }

    #[test]
    fn test_book_file_error_names_the_path() {
        let error = SdkError::BookFileError {
            path: PathBuf::from("books/missing.book"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(error.to_string().contains("books/missing.book"));
        assert!(error.to_string().contains("gone"));
    }

    #[test]
    fn test_compile_error_conversion() {
        let compile_error = CompileError::Validation("circular".to_string());
        let sdk_error: SdkError = compile_error.into();
        assert!(matches!(sdk_error, SdkError::CompileError(_)));
        assert!(sdk_error.to_string().contains("circular"));
    }

    #[test]
    fn test_duplicate_url_message() {
        let error = SdkError::DuplicatePipelineUrl {
            url: "https://example.com/a.book".to_string(),
            first: "A".to_string(),
            second: "B".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Pipeline URL https://example.com/a.book is used by both \"A\" and \"B\""
        );
    }
}
