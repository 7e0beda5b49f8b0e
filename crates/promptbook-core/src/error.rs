//! Error types for Promptbook Core

use thiserror::Error;

/// Core error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// A parameter name failed validation
    #[error("Invalid parameter name \"{name}\": {message}")]
    InvalidParameterName { name: String, message: String },

    /// A parameter name collides with a pipeline-internal context key
    #[error("Parameter name {{{0}}} is reserved, please use a different name")]
    ReservedParameterName(String),

    /// A parameter was declared twice with different descriptions
    #[error(
        "Parameter {{{name}}} is defined multiple times with different descriptions:\n\nFirst definition:\n{first}\n\nSecond definition:\n{second}"
    )]
    ParameterRedefinition {
        name: String,
        first: String,
        second: String,
    },

    /// A parameter was marked both as input and as output
    #[error("Parameter {{{0}}} can not be both input and output")]
    ConflictingParameterRole(String),

    /// Invalid value
    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
