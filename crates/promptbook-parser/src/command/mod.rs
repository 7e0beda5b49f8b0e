//! Book commands
//!
//! Every list item of a book is one command. This module tokenizes the line,
//! finds the parser owning the command name and turns the line into a
//! [`Command`](promptbook_core::Command).

pub mod input;
pub mod parser;
pub mod parsers;
pub mod registry;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use input::{normalize_command_text, CommandInput, CommandLine, NameCandidate, NamePosition};
pub use parser::CommandParser;
pub use registry::{parse_command, CommandRegistry};

/// Part of the book a command is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UsagePlace {
    /// List items under the `#` heading
    PipelineHead,
    /// List items under a `##` heading
    PipelineTask,
}

impl fmt::Display for UsagePlace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsagePlace::PipelineHead => write!(f, "pipeline head"),
            UsagePlace::PipelineTask => write!(f, "pipeline task"),
        }
    }
}
