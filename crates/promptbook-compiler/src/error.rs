//! Compiler error types

use promptbook_parser::ParseError;
use thiserror::Error;

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compiler error
///
/// Every error is fatal, compilation never returns a partial pipeline.
#[derive(Error, Debug)]
pub enum CompileError {
    /// The book or one of its command lines can not be read
    #[error(transparent)]
    Syntax(#[from] ParseError),

    /// A command conflicts with what the book already defined
    #[error("{message}\n\nCommand:\n- {raw_command}\n\nUsage:\n{}\n\nCurrent state:\n{task_snapshot}", bullet_list(.usage))]
    Semantic {
        message: String,
        /// JSON of the task (or the pipeline head) when the command failed
        task_snapshot: String,
        raw_command: String,
        usage: Vec<String>,
    },

    /// The assembled pipeline breaks an internal invariant
    #[error("Structural error: {0}")]
    Structural(String),

    /// A script block can not be analyzed
    #[error("Script analysis error: {0}")]
    ScriptAnalysis(String),

    /// Logic validation of the finished pipeline failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error raised in a pipeline with a known URL
    #[error("{source}\n\nPipeline: {url}")]
    InPipeline {
        url: String,
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Attach the pipeline URL unless it is attached already
    pub fn in_pipeline(self, url: Option<&str>) -> Self {
        match (url, self) {
            (_, error @ CompileError::InPipeline { .. }) => error,
            (Some(url), error) => CompileError::InPipeline {
                url: url.to_string(),
                source: Box::new(error),
            },
            (None, error) => error,
        }
    }

    /// The error without pipeline context
    pub fn root(&self) -> &CompileError {
        match self {
            CompileError::InPipeline { source, .. } => source.root(),
            error => error,
        }
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
