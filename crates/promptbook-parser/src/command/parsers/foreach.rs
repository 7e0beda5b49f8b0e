//! `FOREACH` command
//!
//! `FOREACH Csv Row {customers} -> {firstName}, {lastName}, +{greeting}`
//! runs the task once per row, the row cells become `{firstName}` and
//! `{lastName}` and each result is stored as `{greeting}`.

use super::next_arg;
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::command::{find_foreach_format, FOREACH_FORMATS};
use promptbook_core::constants::DEFAULT_FOREACH_OUTPUT_SUBPARAMETER;
use promptbook_core::naming::{normalize_to_screaming_case, validate_parameter_name};
use promptbook_core::{Command, ForeachJson, PipelineBuilder, TaskBuilder, TaskJson};

/// Iterates the task over the items of a structured parameter
pub struct ForeachCommandParser;

fn parse_format(raw_format: &str, raw_subformat: &str) -> Result<(String, String)> {
    let format_name = normalize_to_screaming_case(raw_format);
    let Some(format) = find_foreach_format(&format_name) else {
        return Err(ParseError::invalid_value(
            "format",
            format!(
                "Unsupported format \"{}\", supported formats are {}",
                raw_format,
                FOREACH_FORMATS
                    .iter()
                    .map(|format| format.name)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        ));
    };

    if format.subformat_names.is_empty() {
        return Err(ParseError::invalid_value(
            "subformat",
            format!("Format {} has no parts to iterate over yet", format.name),
        ));
    }

    let subformat_name = normalize_to_screaming_case(raw_subformat);
    let subformat = format
        .subformat_names
        .iter()
        .find(|name| {
            **name == subformat_name || subformat_name.strip_suffix('S') == Some(**name)
        })
        .ok_or_else(|| {
            ParseError::invalid_value(
                "subformat",
                format!(
                    "Format {} can not be iterated by \"{}\", use {}",
                    format.name,
                    raw_subformat,
                    format.subformat_names.join(" or ")
                ),
            )
        })?;

    Ok((format.name.to_string(), subformat.to_string()))
}

impl CommandParser for ForeachCommandParser {
    fn name(&self) -> &'static str {
        "FOREACH"
    }

    fn command_type(&self) -> &'static str {
        "FOREACH"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &["FOR", "EACH", "FOR_EACH"]
    }

    fn description(&self) -> &'static str {
        "Runs the task for each line, row or cell of a parameter"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "FOREACH Text Line `{customers}` -> `{customer}`",
            "FOR Text Line `{customers}` -> `{customer}`",
            "FOREACH Csv Cell `{customers}` -> `{cell}`, `+{translatedCell}`",
            "EACH Csv Row `{customers}` -> `{firstName}`, `{lastName}`, `+{email}`",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        let raw_format = next_arg(&mut args, "format")?;
        let raw_subformat = next_arg(&mut args, "subformat")?;
        let (format_name, subformat_name) = parse_format(&raw_format, &raw_subformat)?;

        let parameter_name = validate_parameter_name(&next_arg(&mut args, "parameter name")?)?;

        let arrow = next_arg(&mut args, "->")?;
        if arrow != "->" {
            return Err(ParseError::invalid_value(
                "->",
                format!(
                    "Expected -> after {{{}}} but found \"{}\"",
                    parameter_name, arrow
                ),
            ));
        }

        let mut input_subparameter_names = Vec::new();
        let mut output_subparameter_names = Vec::new();
        for piece in args
            .iter()
            .flat_map(|arg| arg.split(','))
            .map(|piece| piece.trim().trim_matches('`'))
            .filter(|piece| !piece.is_empty())
        {
            match piece.strip_prefix('+') {
                Some(output) => output_subparameter_names.push(validate_parameter_name(output)?),
                None => input_subparameter_names.push(validate_parameter_name(piece)?),
            }
        }

        if input_subparameter_names.is_empty() {
            return Err(ParseError::invalid_value(
                "subparameters",
                "At least one subparameter must follow ->",
            ));
        }

        let output_subparameter_name = match output_subparameter_names.as_slice() {
            [output] => output.clone(),
            [] if format_name == "TEXT" && subformat_name == "LINE" => {
                DEFAULT_FOREACH_OUTPUT_SUBPARAMETER.to_string()
            }
            [] => {
                return Err(ParseError::invalid_value(
                    "output subparameter",
                    format!(
                        "FOREACH {} {} needs the output subparameter marked with +, e.g. +{{newValue}}",
                        format_name, subformat_name
                    ),
                ))
            }
            _ => {
                return Err(ParseError::invalid_value(
                    "output subparameter",
                    "Only one output subparameter can be marked with +",
                ))
            }
        };

        Ok(Command::Foreach(ForeachJson {
            format_name,
            subformat_name,
            parameter_name,
            input_subparameter_names,
            output_subparameter_name,
        }))
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        let Command::Foreach(foreach) = command else {
            return None;
        };

        let mut subparameters: Vec<String> = foreach
            .input_subparameter_names
            .iter()
            .map(|name| format!("{{{}}}", name))
            .collect();
        subparameters.push(format!("+{{{}}}", foreach.output_subparameter_name));

        Some(format!(
            "FOREACH {} {} {{{}}} -> {}",
            foreach.format_name,
            foreach.subformat_name,
            foreach.parameter_name,
            subparameters.join(", ")
        ))
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Foreach(foreach) = command else {
            return Err(foreign_command(self, command));
        };

        if let Some(existing) = &task.foreach {
            if existing != foreach {
                return Err(ApplyError::Invalid(format!(
                    "Task \"{}\" can iterate only over one parameter, FOREACH is already defined over {{{}}}",
                    task.title, existing.parameter_name
                )));
            }
        }

        task.foreach = Some(foreach.clone());
        Ok(())
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        task.foreach.iter().cloned().map(Command::Foreach).collect()
    }
}
