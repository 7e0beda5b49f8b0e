//! `PERSONA` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::{Command, PipelineBuilder, PipelineJson, TaskBuilder, TaskJson};

/// Assigns a persona the prompts are written from
pub struct PersonaCommandParser;

impl CommandParser for PersonaCommandParser {
    fn name(&self) -> &'static str {
        "PERSONA"
    }

    fn command_type(&self) -> &'static str {
        "PERSONA"
    }

    fn description(&self) -> &'static str {
        "Persona of the model answering the prompt, in the head it applies to the whole pipeline"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead, UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "PERSONA Jane, skilled copywriter",
            "PERSONA Joe; math teacher who explains everything twice",
            "PERSONA Paul",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let raw_args = input.raw_args.trim();
        if raw_args.is_empty() {
            return Err(ParseError::missing("persona name"));
        }

        let (name, description) = match raw_args.split_once([',', ';', ':']) {
            Some((name, description)) => (name.trim(), Some(description.trim())),
            None => (raw_args, None),
        };

        if name.is_empty() {
            return Err(ParseError::missing("persona name"));
        }

        Ok(Command::Persona {
            persona_name: name.to_string(),
            persona_description: description
                .filter(|description| !description.is_empty())
                .map(str::to_string),
        })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        let Command::Persona {
            persona_name,
            persona_description,
        } = command
        else {
            return None;
        };

        Some(match persona_description {
            Some(description) => format!("PERSONA {}, {}", persona_name, description),
            None => format!("PERSONA {}", persona_name),
        })
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Persona {
            persona_name,
            persona_description,
        } = command
        else {
            return Err(foreign_command(self, command));
        };

        pipeline.register_persona(persona_name, persona_description.as_deref());
        Ok(())
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Persona {
            persona_name,
            persona_description,
        } = command
        else {
            return Err(foreign_command(self, command));
        };

        if let Some(existing) = &task.persona_name {
            if existing != persona_name {
                return Err(ApplyError::redefinition(
                    format!("Persona of the task \"{}\"", task.title),
                    existing,
                    persona_name,
                ));
            }
        }

        task.persona_name = Some(persona_name.clone());
        pipeline.register_persona(persona_name, persona_description.as_deref());
        Ok(())
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .personas
            .iter()
            .map(|persona| Command::Persona {
                persona_name: persona.name.clone(),
                persona_description: persona.description.clone(),
            })
            .collect()
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        task.persona_name
            .iter()
            .map(|name| Command::Persona {
                persona_name: name.clone(),
                persona_description: None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    #[test]
    fn test_parse_persona() {
        assert_eq!(
            parse_command("PERSONA Jane, skilled copywriter", UsagePlace::PipelineTask).unwrap(),
            Command::Persona {
                persona_name: "Jane".to_string(),
                persona_description: Some("skilled copywriter".to_string()),
            }
        );
        assert_eq!(
            parse_command("PERSONA Paul", UsagePlace::PipelineHead).unwrap(),
            Command::Persona {
                persona_name: "Paul".to_string(),
                persona_description: None,
            }
        );
    }

    #[test]
    fn test_task_can_have_only_one_persona() {
        let parser = PersonaCommandParser;
        let mut pipeline = PipelineBuilder::new("Test");
        let mut task = TaskBuilder::new("write", "Write");

        let jane = parse_command("PERSONA Jane, copywriter", UsagePlace::PipelineTask).unwrap();
        let joe = parse_command("PERSONA Joe", UsagePlace::PipelineTask).unwrap();

        parser.apply_to_task(&jane, &mut task, &mut pipeline).unwrap();
        assert_eq!(task.persona_name.as_deref(), Some("Jane"));
        assert_eq!(pipeline.personas.len(), 1);

        assert!(parser.apply_to_task(&joe, &mut task, &mut pipeline).is_err());
    }
}
