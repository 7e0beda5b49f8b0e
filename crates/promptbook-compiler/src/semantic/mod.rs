//! Semantic analysis module
//!
//! This module finds the parameters tasks depend on and validates the logic
//! of compiled pipelines.

pub mod parameters;
pub mod script;
pub mod validator;

// Re-export for convenience
pub use parameters::{extract_parameter_names, extract_parameter_names_from_task};
pub use script::{extract_script_variables, ScriptLimits};
pub use validator::validate_pipeline;
