//! `JOKER` command

use super::{expect_no_more_args, next_arg};
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyResult, Result};
use promptbook_core::naming::validate_parameter_name;
use promptbook_core::{Command, PipelineBuilder, TaskBuilder, TaskJson};

/// Parameter that, when it already satisfies the expectations, is used
/// instead of running the task
pub struct JokerCommandParser;

impl CommandParser for JokerCommandParser {
    fn name(&self) -> &'static str {
        "JOKER"
    }

    fn command_type(&self) -> &'static str {
        "JOKER"
    }

    fn description(&self) -> &'static str {
        "Parameter used as the result when it already meets the expectations"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &["JOKER {documentTitle}"]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        let parameter_name = validate_parameter_name(&next_arg(&mut args, "parameter name")?)?;
        expect_no_more_args(&args)?;

        Ok(Command::Joker { parameter_name })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Joker { parameter_name } => Some(format!("JOKER {{{}}}", parameter_name)),
            _ => None,
        }
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Joker { parameter_name } = command else {
            return Err(foreign_command(self, command));
        };

        if !task.joker_parameter_names.contains(parameter_name) {
            task.joker_parameter_names.push(parameter_name.clone());
        }
        Ok(())
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        task.joker_parameter_names
            .iter()
            .map(|parameter_name| Command::Joker {
                parameter_name: parameter_name.clone(),
            })
            .collect()
    }
}
