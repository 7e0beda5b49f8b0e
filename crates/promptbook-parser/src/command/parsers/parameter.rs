//! `PARAMETER` command

use super::next_arg;
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyResult, ParseError, Result};
use promptbook_core::naming::validate_parameter_name;
use promptbook_core::{
    Command, ParameterBuilder, ParameterCommand, ParameterRole, PipelineBuilder, PipelineJson,
    TaskBuilder,
};

/// Declares a parameter, optionally as an input or an output of the pipeline
pub struct ParameterCommandParser;

impl ParameterCommandParser {
    fn define(command: &ParameterCommand, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let role = match (command.is_input, command.is_output) {
            (true, false) => Some(ParameterRole::Input),
            (false, true) => Some(ParameterRole::Output),
            (false, false) => None,
            (true, true) => {
                return Err(promptbook_core::CoreError::ConflictingParameterRole(
                    command.parameter_name.clone(),
                )
                .into())
            }
        };

        pipeline.define_parameter(
            ParameterBuilder::new(&command.parameter_name)
                .with_description(command.parameter_description.clone())
                .with_role(role),
        )?;
        Ok(())
    }
}

impl CommandParser for ParameterCommandParser {
    fn name(&self) -> &'static str {
        "PARAMETER"
    }

    fn command_type(&self) -> &'static str {
        "PARAMETER"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &[
            "PARAM",
            "INPUT_PARAMETER",
            "INPUT_PARAM",
            "OUTPUT_PARAMETER",
            "OUTPUT_PARAM",
        ]
    }

    fn description(&self) -> &'static str {
        "Declares a parameter with its description, input and output parameters form the interface of the pipeline"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead, UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "PARAMETER {title} Title of the book",
            "INPUT PARAMETER {topic} Topic of the poem",
            "OUTPUT PARAMETER {poem}",
            "INPUT PARAM {name}",
            "PARAM `{context_notes}` Notes for the writer",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let is_input = input.normalized.starts_with("INPUT");
        let is_output = input.normalized.starts_with("OUTPUT");

        let mut args = input.args;
        let name = next_arg(&mut args, "parameter name")?;
        let parameter_name = validate_parameter_name(&name)?;

        let description = input
            .raw_args
            .trim()
            .split_once(char::is_whitespace)
            .map(|(_, rest)| rest.trim().to_string())
            .filter(|rest| !rest.is_empty());

        if let Some(description) = &description {
            if description.contains('{') || description.contains('}') {
                return Err(ParseError::invalid_value(
                    "parameter description",
                    format!(
                        "Parameter description can not contain curly braces, it looks like it contains another parameter:\n\n{}",
                        description
                    ),
                ));
            }
        }

        Ok(Command::Parameter(ParameterCommand {
            parameter_name,
            parameter_description: description,
            is_input,
            is_output,
        }))
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        let Command::Parameter(parameter) = command else {
            return None;
        };

        let prefix = match (parameter.is_input, parameter.is_output) {
            (true, _) => "INPUT ",
            (false, true) => "OUTPUT ",
            (false, false) => "",
        };
        let mut line = format!("{}PARAMETER {{{}}}", prefix, parameter.parameter_name);
        if let Some(description) = &parameter.parameter_description {
            line.push(' ');
            line.push_str(description);
        }
        Some(line)
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Parameter(parameter) = command else {
            return Err(foreign_command(self, command));
        };
        Self::define(parameter, pipeline)
    }

    fn apply_to_task(
        &self,
        command: &Command,
        _task: &mut TaskBuilder,
        pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Parameter(parameter) = command else {
            return Err(foreign_command(self, command));
        };
        Self::define(parameter, pipeline)
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .parameters
            .iter()
            .filter(|p| p.role != ParameterRole::Intermediate || p.description.is_some())
            .map(|p| {
                Command::Parameter(ParameterCommand {
                    parameter_name: p.name.clone(),
                    parameter_description: p.description.clone(),
                    is_input: p.is_input(),
                    is_output: p.is_output(),
                })
            })
            .collect()
    }
}
