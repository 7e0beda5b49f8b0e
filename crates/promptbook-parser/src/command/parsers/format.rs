//! `FORMAT` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::{Command, FormatName, PipelineBuilder, TaskBuilder, TaskJson};

/// Expects the result in a structured format
pub struct FormatCommandParser;

impl CommandParser for FormatCommandParser {
    fn name(&self) -> &'static str {
        "FORMAT"
    }

    fn command_type(&self) -> &'static str {
        "EXPECT_FORMAT"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &["EXPECT_FORMAT", "EXPECT_JSON"]
    }

    fn description(&self) -> &'static str {
        "Structured format the result must be in"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &["FORMAT JSON", "EXPECT JSON", "EXPECT FORMAT JSON", "Expect json"]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        if !input.normalized.split('_').any(|token| token == "JSON") {
            return Err(ParseError::invalid_value(
                "format",
                "For now only JSON format is supported",
            ));
        }

        Ok(Command::ExpectFormat {
            format: FormatName::Json,
        })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::ExpectFormat { format } => Some(format!("FORMAT {}", format.as_str())),
            _ => None,
        }
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::ExpectFormat { format } = command else {
            return Err(foreign_command(self, command));
        };

        match task.format {
            Some(existing) if existing != *format => Err(ApplyError::redefinition(
                format!("Format of the task \"{}\"", task.title),
                existing.as_str(),
                format.as_str(),
            )),
            _ => {
                task.format = Some(*format);
                Ok(())
            }
        }
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        task.format
            .iter()
            .map(|format| Command::ExpectFormat { format: *format })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    #[test]
    fn test_every_spelling_is_json() {
        for line in ["FORMAT JSON", "EXPECT JSON", "EXPECT FORMAT JSON", "format `json`"] {
            assert_eq!(
                parse_command(line, UsagePlace::PipelineTask).unwrap(),
                Command::ExpectFormat {
                    format: FormatName::Json
                },
                "{}",
                line
            );
        }
    }

    #[test]
    fn test_only_json_is_supported() {
        let error = parse_command("FORMAT YAML", UsagePlace::PipelineTask).unwrap_err();
        assert!(error.to_string().contains("only JSON"));
    }
}
