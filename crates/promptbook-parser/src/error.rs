//! Parser error types

use crate::command::UsagePlace;
use promptbook_core::CoreError;
use thiserror::Error;

fn comma_list(items: &[String]) -> String {
    items.join(", ")
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {}", item))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parser error
///
/// Raised for lines and documents that can not be read at all. Conflicts with
/// previously applied commands are reported as [`ApplyError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Heading levels or section ordering are broken
    #[error("Structural error: {0}")]
    Structure(String),

    /// A section body can not be interpreted
    #[error("Invalid section \"{section}\": {message}")]
    InvalidSection { section: String, message: String },

    /// Command lines must be single lines
    #[error("Command can not contain new lines:\n\n{0}")]
    MultilineCommand(String),

    /// No parser knows the command
    #[error("Unknown command:\n\n- {raw}\n\nSupported commands in the {place} are:\n{}", bullet_list(.supported))]
    UnknownCommand {
        raw: String,
        place: UsagePlace,
        supported: Vec<String>,
    },

    /// More than one parser claims the command
    #[error("Ambiguous command:\n\n- {raw}\n\nIt matches commands {}\n\nSupported commands in the {place} are:\n{}", comma_list(.candidates), bullet_list(.supported))]
    AmbiguousCommand {
        raw: String,
        place: UsagePlace,
        candidates: Vec<String>,
        supported: Vec<String>,
    },

    /// The command exists but is not legal in this part of the book
    #[error("Command {command} is not allowed in the {place}:\n\n- {raw}\n\nCommands allowed in the {place} are:\n{}", bullet_list(.allowed))]
    CommandNotAllowed {
        raw: String,
        command: String,
        place: UsagePlace,
        allowed: Vec<String>,
    },

    /// The command was recognized but its arguments are malformed
    #[error("Invalid {command} command:\n\nYour command:\n- {raw}\n\nThe detailed error:\n{message}\n\nUsage of {command}:\n{}", bullet_list(.usage))]
    InvalidCommand {
        command: String,
        raw: String,
        message: String,
        usage: Vec<String>,
    },

    /// Missing required argument
    #[error("Missing required argument: {field}")]
    MissingField { field: String },

    /// Invalid argument value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Core validation error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ParseError {
    pub(crate) fn invalid_value(field: &str, message: impl Into<String>) -> Self {
        ParseError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: &str) -> Self {
        ParseError::MissingField {
            field: field.to_string(),
        }
    }
}

/// Error raised when a command conflicts with what was already applied
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApplyError {
    /// A set-once value was already set to something else
    #[error("{what} is already defined as \"{first}\", it can not be redefined to \"{second}\"")]
    Redefinition {
        what: String,
        first: String,
        second: String,
    },

    /// The section type was set by an earlier command
    #[error("Section type is already defined in the section as {first} SECTION, it can not be changed to {second} SECTION.\nIt can be defined only once.")]
    SectionTypeRedefinition {
        first: &'static str,
        second: &'static str,
    },

    /// The command is legal but does not make sense in the current state
    #[error("{0}")]
    Invalid(String),

    /// The command has no effect in this part of the book
    #[error("Command {command} can not be applied in the {place}")]
    NotApplicable { command: String, place: UsagePlace },

    /// Core validation error
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApplyError {
    pub(crate) fn redefinition(
        what: impl Into<String>,
        first: impl ToString,
        second: impl ToString,
    ) -> Self {
        ApplyError::Redefinition {
            what: what.into(),
            first: first.to_string(),
            second: second.to_string(),
        }
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// Result type for apply operations
pub type ApplyResult<T> = std::result::Result<T, ApplyError>;
