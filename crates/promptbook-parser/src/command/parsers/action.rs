//! `ACTION` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyResult, Result};
use log::error;
use promptbook_core::{Command, PipelineBuilder};

/// Declares an action of the pipeline, parsed but not compiled yet
pub struct ActionCommandParser;

impl CommandParser for ActionCommandParser {
    fn name(&self) -> &'static str {
        "ACTION"
    }

    fn command_type(&self) -> &'static str {
        "ACTION"
    }

    fn description(&self) -> &'static str {
        "Action the pipeline can take, reserved for future use"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead]
    }

    fn examples(&self) -> &'static [&'static str] {
        &["ACTION"]
    }

    fn parse(&self, _input: CommandInput) -> Result<Command> {
        Ok(Command::Action)
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Action => Some("ACTION".to_string()),
            _ => None,
        }
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Action = command else {
            return Err(foreign_command(self, command));
        };

        error!(
            "ACTION command is not implemented yet, it is ignored in the pipeline \"{}\"",
            pipeline.title
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    #[test]
    fn test_action_is_ignored() {
        let command = parse_command("ACTION", UsagePlace::PipelineHead).unwrap();
        assert_eq!(command, Command::Action);

        let mut pipeline = PipelineBuilder::new("Test");
        assert!(ActionCommandParser.apply_to_pipeline(&command, &mut pipeline).is_ok());
        assert_eq!(pipeline.build().tasks.len(), 0);
    }
}
