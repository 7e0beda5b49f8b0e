//! `POSTPROCESS` command

use super::{expect_no_more_args, next_arg};
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyResult, ParseError, Result};
use promptbook_core::naming::is_valid_identifier;
use promptbook_core::{Command, PipelineBuilder, TaskBuilder, TaskJson};

/// Function applied to the result of the task, in the order written
pub struct PostprocessCommandParser;

impl CommandParser for PostprocessCommandParser {
    fn name(&self) -> &'static str {
        "POSTPROCESS"
    }

    fn command_type(&self) -> &'static str {
        "POSTPROCESS"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &["POSTPROCESSING", "PP"]
    }

    fn description(&self) -> &'static str {
        "Function the result of the task is passed through"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "POSTPROCESS unwrapResult",
            "POSTPROCESSING `trim`",
            "PP removeQuotes",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        let function_name = next_arg(&mut args, "function name")?;
        expect_no_more_args(&args)?;

        if !is_valid_identifier(&function_name) {
            return Err(ParseError::invalid_value(
                "function name",
                format!("\"{}\" is not a valid function name", function_name),
            ));
        }

        Ok(Command::Postprocess { function_name })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Postprocess { function_name } => Some(format!("POSTPROCESS {}", function_name)),
            _ => None,
        }
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Postprocess { function_name } = command else {
            return Err(foreign_command(self, command));
        };

        task.postprocessing_function_names.push(function_name.clone());
        Ok(())
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        task.postprocessing_function_names
            .iter()
            .map(|function_name| Command::Postprocess {
                function_name: function_name.clone(),
            })
            .collect()
    }
}
