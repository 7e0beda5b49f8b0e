//! `INSTRUMENT` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyResult, Result};
use log::error;
use promptbook_core::{Command, PipelineBuilder};

/// Declares an instrument of the pipeline, parsed but not compiled yet
pub struct InstrumentCommandParser;

impl CommandParser for InstrumentCommandParser {
    fn name(&self) -> &'static str {
        "INSTRUMENT"
    }

    fn command_type(&self) -> &'static str {
        "INSTRUMENT"
    }

    fn description(&self) -> &'static str {
        "Instrument the pipeline can use, reserved for future use"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead]
    }

    fn examples(&self) -> &'static [&'static str] {
        &["INSTRUMENT"]
    }

    fn parse(&self, _input: CommandInput) -> Result<Command> {
        Ok(Command::Instrument)
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Instrument => Some("INSTRUMENT".to_string()),
            _ => None,
        }
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Instrument = command else {
            return Err(foreign_command(self, command));
        };

        error!(
            "INSTRUMENT command is not implemented yet, it is ignored in the pipeline \"{}\"",
            pipeline.title
        );
        Ok(())
    }
}
