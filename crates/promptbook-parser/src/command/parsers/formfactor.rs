//! `FORMFACTOR` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::constants::DEFAULT_FORMFACTOR_NAME;
use promptbook_core::formfactor::{find_formfactor, FORMFACTOR_DEFINITIONS};
use promptbook_core::naming::normalize_to_screaming_case;
use promptbook_core::{Command, PipelineBuilder, PipelineJson};

/// Declares the interface shape of the pipeline
pub struct FormfactorCommandParser;

impl CommandParser for FormfactorCommandParser {
    fn name(&self) -> &'static str {
        "FORMFACTOR"
    }

    fn command_type(&self) -> &'static str {
        "FORMFACTOR"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &["FORM_FACTOR"]
    }

    fn description(&self) -> &'static str {
        "Interface of the pipeline, like a chatbot or a translator"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "FORMFACTOR Chatbot",
            "FORMFACTOR Generic",
            "FORM FACTOR Translator",
            "FORMFACTOR Image Generator",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let requested = normalize_to_screaming_case(&input.raw_args);
        if requested.is_empty() {
            return Err(ParseError::missing("formfactor name"));
        }

        let formfactor = find_formfactor(&requested).ok_or_else(|| {
            ParseError::invalid_value(
                "formfactor name",
                format!(
                    "Unknown formfactor \"{}\", supported formfactors are: {}",
                    input.raw_args,
                    FORMFACTOR_DEFINITIONS
                        .iter()
                        .map(|f| f.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                ),
            )
        })?;

        Ok(Command::Formfactor {
            formfactor_name: formfactor.name.to_string(),
        })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Formfactor { formfactor_name } => Some(format!("FORMFACTOR {}", formfactor_name)),
            _ => None,
        }
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Formfactor { formfactor_name } = command else {
            return Err(foreign_command(self, command));
        };

        match &pipeline.formfactor_name {
            Some(existing) if existing != formfactor_name => Err(ApplyError::redefinition(
                "Formfactor",
                existing,
                formfactor_name,
            )),
            _ => {
                pipeline.formfactor_name = Some(formfactor_name.clone());
                Ok(())
            }
        }
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .formfactor_name
            .iter()
            .filter(|name| name.as_str() != DEFAULT_FORMFACTOR_NAME)
            .map(|name| Command::Formfactor {
                formfactor_name: name.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    #[test]
    fn test_parse_alias() {
        let command = parse_command("FORMFACTOR Chat", UsagePlace::PipelineHead).unwrap();
        assert_eq!(
            command,
            Command::Formfactor {
                formfactor_name: "CHATBOT".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_formfactor() {
        let error = parse_command("FORMFACTOR Poem", UsagePlace::PipelineHead).unwrap_err();
        assert!(error.to_string().contains("Unknown formfactor"));
    }
}
