//! Promptbook Compiler - Book to PipelineJson compiler
//!
//! This crate assembles parsed books into [`PipelineJson`](promptbook_core::PipelineJson):
//! it applies commands, extracts task dependencies (including free variables
//! of script sections), resolves parameter roles, runs the high-level
//! abstractions and optionally validates the logic of the result.

pub mod abstraction;
pub mod assembler;
pub mod compiler;
pub mod error;
pub mod semantic;
pub mod unparse;

// Re-export main types
pub use abstraction::{apply_high_level_abstractions, HighLevelAbstraction};
pub use assembler::{assemble_pipeline, resolve_parameter_roles};
pub use compiler::{compile, Compiler, CompilerOptions};
pub use error::{CompileError, Result};
pub use semantic::{
    extract_parameter_names, extract_parameter_names_from_task, extract_script_variables,
    validate_pipeline, ScriptLimits,
};
pub use unparse::pipeline_to_book;
