//! `BOOK VERSION` command

use super::{expect_no_more_args, next_arg};
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::{Command, PipelineBuilder, PipelineJson};

/// Declares which version of the book language the book is written in
pub struct BookVersionCommandParser;

impl CommandParser for BookVersionCommandParser {
    fn name(&self) -> &'static str {
        "BOOK_VERSION"
    }

    fn command_type(&self) -> &'static str {
        "BOOK_VERSION"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &["BOOK"]
    }

    fn deprecated_names(&self) -> &'static [&'static str] {
        &["PROMPTBOOK_VERSION", "PTBK_VERSION"]
    }

    fn description(&self) -> &'static str {
        "Version of the book language the book is written in"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead]
    }

    fn examples(&self) -> &'static [&'static str] {
        &["BOOK VERSION 1.0.0", "BOOK 2.0.0", "BOOK_VERSION 0.61.0"]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        if args
            .front()
            .is_some_and(|arg| arg.eq_ignore_ascii_case("VERSION"))
        {
            args.pop_front();
        }

        let version = next_arg(&mut args, "version")?;
        expect_no_more_args(&args)?;

        semver::Version::parse(&version).map_err(|error| {
            ParseError::invalid_value(
                "version",
                format!("\"{}\" is not a valid semantic version: {}", version, error),
            )
        })?;

        Ok(Command::BookVersion {
            book_version: version,
        })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::BookVersion { book_version } => Some(format!("BOOK VERSION {}", book_version)),
            _ => None,
        }
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::BookVersion { book_version } = command else {
            return Err(foreign_command(self, command));
        };

        match &pipeline.book_version {
            Some(existing) if existing != book_version => Err(ApplyError::redefinition(
                "Book version",
                existing,
                book_version,
            )),
            _ => {
                pipeline.book_version = Some(book_version.clone());
                Ok(())
            }
        }
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .book_version
            .iter()
            .map(|book_version| Command::BookVersion {
                book_version: book_version.clone(),
            })
            .collect()
    }
}
