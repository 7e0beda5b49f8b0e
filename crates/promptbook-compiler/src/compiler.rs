//! Main compiler
//!
//! Provides a unified interface for compiling books into pipelines.

use crate::assembler::assemble_pipeline;
use crate::error::Result;
use crate::semantic::{validate_pipeline, ScriptLimits};
use log::debug;
use promptbook_core::PipelineJson;
use promptbook_parser::{BookDocument, BookParser};
use serde::{Deserialize, Serialize};

/// Compiler options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerOptions {
    /// Run the high-level abstraction passes
    pub enable_high_level_abstractions: bool,
    /// Validate the logic of the compiled pipeline
    pub enable_logic_validation: bool,
    /// Maximum number of distinct identifiers in one script
    pub max_script_identifiers: usize,
    /// Maximum nesting of template literals and f-strings in one script
    pub max_script_nesting: usize,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        let limits = ScriptLimits::default();
        Self {
            enable_high_level_abstractions: true,
            enable_logic_validation: true,
            max_script_identifiers: limits.max_identifiers,
            max_script_nesting: limits.max_nesting,
        }
    }
}

impl CompilerOptions {
    pub fn script_limits(&self) -> ScriptLimits {
        ScriptLimits {
            max_identifiers: self.max_script_identifiers,
            max_nesting: self.max_script_nesting,
        }
    }
}

/// The book compiler
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    /// Create a new compiler instance with default options
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    /// Create a new compiler instance with custom options
    pub fn with_options(options: CompilerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Compile a book into a pipeline
    pub fn compile(&self, book: &str) -> Result<PipelineJson> {
        let document = BookParser::parse(book)?;
        self.compile_document(&document)
    }

    /// Compile a book read from a file, the path is recorded in the sources
    pub fn compile_source(&self, book: &str, path: &str) -> Result<PipelineJson> {
        let mut pipeline = self.compile(book)?;
        if let Some(source) = pipeline.sources.first_mut() {
            source.path = Some(path.to_string());
        }
        Ok(pipeline)
    }

    /// Compile an already parsed book
    pub fn compile_document(&self, document: &BookDocument) -> Result<PipelineJson> {
        let pipeline = assemble_pipeline(document, &self.options)?;

        if self.options.enable_logic_validation {
            validate_pipeline(&pipeline)
                .map_err(|error| error.in_pipeline(pipeline.pipeline_url.as_deref()))?;
        }

        debug!(
            "Compiled \"{}\" into {} tasks and {} parameters",
            pipeline.title,
            pipeline.tasks.len(),
            pipeline.parameters.len()
        );
        Ok(pipeline)
    }
}

/// Compile a book with the default options and without logic validation
pub fn compile(book: &str) -> Result<PipelineJson> {
    Compiler::with_options(CompilerOptions {
        enable_logic_validation: false,
        ..CompilerOptions::default()
    })
    .compile(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;

    #[test]
    fn test_compile_records_source_path() {
        let compiler = Compiler::new();
        let pipeline = compiler
            .compile_source("# Hello\n\n## Greet\n\nSay hello to {name}\n\n-> {greeting}", "books/hello.book.md")
            .unwrap();

        assert_eq!(pipeline.sources[0].path.as_deref(), Some("books/hello.book.md"));
        assert_eq!(pipeline.sources[0].content, "# Hello\n\n## Greet\n\nSay hello to {name}\n\n-> {greeting}");
    }

    #[test]
    fn test_validation_is_optional() {
        let book = "# Loop\n\n- INPUT PARAMETER {seed}\n\n## One\n\nUse {b}\n\n-> {a}\n\n## Two\n\nUse {a}\n\n-> {b}";

        assert!(compile(book).is_ok());
        let error = Compiler::new().compile(book).unwrap_err();
        assert!(matches!(error, CompileError::Validation(_)), "{:?}", error);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: CompilerOptions =
            serde_json::from_str(r#"{"enable_logic_validation": false}"#).unwrap();
        assert!(!options.enable_logic_validation);
        assert!(options.enable_high_level_abstractions);
        assert_eq!(options.max_script_identifiers, 256);
    }
}
