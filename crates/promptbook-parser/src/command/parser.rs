//! Command parser trait

use super::{CommandInput, UsagePlace};
use crate::error::{ApplyError, ApplyResult, Result};
use promptbook_core::{Command, PipelineBuilder, PipelineJson, TaskBuilder, TaskJson};

/// Descriptor of one command: how it is written, parsed, applied and
/// reconstructed
///
/// Implemented by one unit struct per command. Parsers only ever receive the
/// commands they produced themselves.
pub trait CommandParser: Send + Sync {
    /// Canonical SCREAMING_SNAKE_CASE name
    fn name(&self) -> &'static str;

    /// `type` tag of the commands this parser produces
    fn command_type(&self) -> &'static str;

    /// Other names the command is recognized by
    fn alias_names(&self) -> &'static [&'static str] {
        &[]
    }

    /// Names still recognized but no longer documented
    fn deprecated_names(&self) -> &'static [&'static str] {
        &[]
    }

    fn description(&self) -> &'static str;

    fn usage_places(&self) -> &'static [UsagePlace];

    /// Example lines, used in error messages and as self-test fixtures
    fn examples(&self) -> &'static [&'static str];

    fn parse(&self, input: CommandInput) -> Result<Command>;

    /// Write the command back as a book line, `None` for foreign commands
    fn stringify(&self, command: &Command) -> Option<String>;

    fn apply_to_pipeline(&self, command: &Command, _pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        Err(ApplyError::NotApplicable {
            command: command.type_name().to_string(),
            place: UsagePlace::PipelineHead,
        })
    }

    fn apply_to_task(
        &self,
        command: &Command,
        _task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        Err(ApplyError::NotApplicable {
            command: command.type_name().to_string(),
            place: UsagePlace::PipelineTask,
        })
    }

    /// Commands of this kind that reproduce the pipeline head
    fn take_from_pipeline(&self, _pipeline: &PipelineJson) -> Vec<Command> {
        Vec::new()
    }

    /// Commands of this kind that reproduce the task
    fn take_from_task(&self, _task: &TaskJson) -> Vec<Command> {
        Vec::new()
    }

    fn is_usable_in(&self, place: UsagePlace) -> bool {
        self.usage_places().contains(&place)
    }

    /// Every name the command is recognized by
    fn all_names(&self) -> Vec<&'static str> {
        let mut names = vec![self.name()];
        names.extend_from_slice(self.alias_names());
        names.extend_from_slice(self.deprecated_names());
        names
    }
}

/// Error for a command handed to a parser that did not produce it
pub(crate) fn foreign_command(parser: &dyn CommandParser, command: &Command) -> ApplyError {
    ApplyError::Invalid(format!(
        "{} command can not be applied by the {} parser",
        command.type_name(),
        parser.name()
    ))
}
