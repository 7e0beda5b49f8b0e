//! Promptbook Parser - markdown book parser for the Promptbook book compiler
//!
//! This crate splits a book into its head and sections and turns every
//! command line into a typed [`Command`](promptbook_core::Command) through
//! the command parser registry.

pub mod book;
pub mod command;
pub mod error;
pub mod markdown;

// Re-export main parser types
pub use book::{BookDocument, BookHead, BookParser, BookSection, ParsedCommand};
pub use command::parsers::COMMAND_PARSERS;
pub use command::{parse_command, CommandInput, CommandParser, CommandRegistry, UsagePlace};
pub use error::{ApplyError, ApplyResult, ParseError, Result};
