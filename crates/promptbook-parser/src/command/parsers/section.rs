//! `SECTION` command

use super::knowledge::KnowledgeCommandParser;
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use log::error;
use promptbook_core::{Command, PipelineBuilder, SectionType, TaskBuilder, TaskJson};

/// Sets the type of the section
pub struct SectionCommandParser;

impl SectionCommandParser {
    fn require_content(task: &TaskBuilder, section_type: SectionType) -> ApplyResult<()> {
        if task.content.trim().is_empty() {
            return Err(ApplyError::Invalid(format!(
                "{} section \"{}\" has no content",
                section_type.keyword(),
                task.title
            )));
        }
        Ok(())
    }

    fn attach_example(task: &TaskBuilder, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Some(parameter_name) = &task.resulting_parameter_name else {
            return Err(ApplyError::Invalid(format!(
                "Example section \"{}\" must end with -> {{parameterName}} naming the parameter it is an example of",
                task.title
            )));
        };

        let Some(parameter) = pipeline.parameter_mut(parameter_name) else {
            return Err(ApplyError::Invalid(format!(
                "Example section \"{}\" refers to undefined parameter {{{}}}, define the parameter before its examples",
                task.title, parameter_name
            )));
        };

        parameter.example_values.push(task.content.clone());
        Ok(())
    }
}

impl CommandParser for SectionCommandParser {
    fn name(&self) -> &'static str {
        "SECTION"
    }

    fn command_type(&self) -> &'static str {
        "SECTION"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &[
            "PROMPT",
            "SIMPLE",
            "SCRIPT",
            "DIALOG",
            "SAMPLE",
            "KNOWLEDGE",
            "INSTRUMENT",
            "ACTION",
        ]
    }

    fn deprecated_names(&self) -> &'static [&'static str] {
        &["BLOCK", "EXECUTE", "TEMPLATE"]
    }

    fn description(&self) -> &'static str {
        "Type of the section, a prompt, simple template, script, dialog, example, knowledge, instrument or action"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "PROMPT SECTION",
            "SIMPLE SECTION",
            "SCRIPT SECTION",
            "DIALOG SECTION",
            "EXAMPLE SECTION",
            "KNOWLEDGE SECTION",
            "INSTRUMENT SECTION",
            "ACTION SECTION",
            "SECTION PROMPT",
            "Prompt section",
            "Sample",
            "PROMPT TEMPLATE",
            "EXECUTE SCRIPT",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let found: Vec<SectionType> = SectionType::ALL
            .into_iter()
            .filter(|section_type| input.normalized.contains(section_type.keyword()))
            .collect();

        let supported = || {
            SectionType::ALL
                .iter()
                .map(|t| t.keyword())
                .collect::<Vec<_>>()
                .join(", ")
        };

        match found.as_slice() {
            [section_type] => Ok(Command::Section {
                section_type: *section_type,
            }),
            [] => Err(ParseError::invalid_value(
                "section type",
                format!("Unknown section type, supported types are: {}", supported()),
            )),
            many => Err(ParseError::invalid_value(
                "section type",
                format!(
                    "Section type is ambiguous, the command mentions {}",
                    many.iter()
                        .map(|t| t.keyword())
                        .collect::<Vec<_>>()
                        .join(" and ")
                ),
            )),
        }
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Section { section_type } => Some(format!("{} SECTION", section_type.keyword())),
            _ => None,
        }
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Section { section_type } = command else {
            return Err(foreign_command(self, command));
        };

        if let Some(first) = task.section_type {
            return Err(ApplyError::SectionTypeRedefinition {
                first: first.keyword(),
                second: section_type.keyword(),
            });
        }
        task.section_type = Some(*section_type);

        match section_type {
            SectionType::Prompt | SectionType::Simple => Self::require_content(task, *section_type),
            SectionType::Dialog => Ok(()),
            SectionType::Script => {
                Self::require_content(task, *section_type)?;
                if task.resulting_parameter_name.is_none() {
                    return Err(ApplyError::Invalid(format!(
                        "Script section \"{}\" must end with a return statement -> {{parameterName}}",
                        task.title
                    )));
                }
                Ok(())
            }
            SectionType::Example => {
                Self::require_content(task, *section_type)?;
                Self::attach_example(task, pipeline)
            }
            SectionType::Knowledge => {
                Self::require_content(task, *section_type)?;
                KnowledgeCommandParser.apply_to_pipeline(
                    &Command::Knowledge {
                        knowledge_source_content: task.content.clone(),
                    },
                    pipeline,
                )
            }
            SectionType::Instrument | SectionType::Action => {
                error!(
                    "{} sections are not implemented yet, section \"{}\" is ignored",
                    section_type.keyword(),
                    task.title
                );
                Ok(())
            }
        }
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        vec![Command::Section {
            section_type: SectionType::from_task_type(task.task_type),
        }]
    }
}
