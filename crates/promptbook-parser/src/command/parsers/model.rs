//! `MODEL` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use log::warn;
use promptbook_core::naming::normalize_to_screaming_case;
use promptbook_core::{
    Command, ModelRequirement, ModelRequirements, ModelVariant, PipelineBuilder, PipelineJson,
    TaskBuilder, TaskJson,
};

/// Sets one requirement on the model
pub struct ModelCommandParser;

fn parse_requirement(key: &str, value: &str) -> Result<ModelRequirement> {
    let invalid = |message: String| ParseError::invalid_value(key, message);

    match key {
        "VARIANT" => match normalize_to_screaming_case(value).as_str() {
            "CHAT" => Ok(ModelRequirement::Variant(ModelVariant::Chat)),
            "COMPLETION" => Ok(ModelRequirement::Variant(ModelVariant::Completion)),
            "EMBEDDING" => Err(invalid(
                "Embedding model can not be used in a pipeline, only CHAT and COMPLETION are supported"
                    .to_string(),
            )),
            _ => Err(invalid(format!(
                "Unknown model variant \"{}\", supported variants are CHAT and COMPLETION",
                value
            ))),
        },
        "NAME" => Ok(ModelRequirement::Name(value.to_string())),
        "TEMPERATURE" => {
            let temperature: f64 = value
                .parse()
                .map_err(|_| invalid(format!("\"{}\" is not a number", value)))?;
            if !(0.0..=2.0).contains(&temperature) {
                return Err(invalid(format!(
                    "Temperature must be between 0 and 2, got {}",
                    temperature
                )));
            }
            Ok(ModelRequirement::Temperature(temperature))
        }
        "MAX_TOKENS" => value
            .parse()
            .map(ModelRequirement::MaxTokens)
            .map_err(|_| invalid(format!("\"{}\" is not a positive whole number", value))),
        "SEED" => value
            .parse()
            .map(ModelRequirement::Seed)
            .map_err(|_| invalid(format!("\"{}\" is not a positive whole number", value))),
        _ => Err(ParseError::invalid_value(
            "model requirement",
            format!(
                "Unknown model requirement \"{}\", supported are VARIANT, NAME, TEMPERATURE, MAX_TOKENS and SEED",
                key
            ),
        )),
    }
}

/// Merge a requirement, identical values only warn
fn merge_requirement(
    requirements: &mut ModelRequirements,
    requirement: &ModelRequirement,
    scope: &str,
) -> ApplyResult<()> {
    fn set<T: PartialEq + Clone + std::fmt::Debug>(
        slot: &mut Option<T>,
        value: &T,
        key: &str,
        scope: &str,
    ) -> ApplyResult<()> {
        match slot.as_ref() {
            Some(existing) if existing == value => {
                warn!("MODEL {} is defined twice with the same value in {}", key, scope);
                Ok(())
            }
            Some(existing) => Err(ApplyError::redefinition(
                format!("MODEL {} in {}", key, scope),
                format!("{:?}", existing),
                format!("{:?}", value),
            )),
            None => {
                *slot = Some(value.clone());
                Ok(())
            }
        }
    }

    let key = requirement.key();
    match requirement {
        ModelRequirement::Variant(variant) => set(&mut requirements.model_variant, variant, key, scope),
        ModelRequirement::Name(name) => set(&mut requirements.model_name, name, key, scope),
        ModelRequirement::Temperature(t) => set(&mut requirements.temperature, t, key, scope),
        ModelRequirement::MaxTokens(m) => set(&mut requirements.max_tokens, m, key, scope),
        ModelRequirement::Seed(seed) => set(&mut requirements.seed, seed, key, scope),
    }
}

fn requirements_to_commands(requirements: &ModelRequirements) -> Vec<Command> {
    let mut list = Vec::new();
    if let Some(variant) = requirements.model_variant {
        list.push(ModelRequirement::Variant(variant));
    }
    if let Some(name) = &requirements.model_name {
        list.push(ModelRequirement::Name(name.clone()));
    }
    if let Some(temperature) = requirements.temperature {
        list.push(ModelRequirement::Temperature(temperature));
    }
    if let Some(max_tokens) = requirements.max_tokens {
        list.push(ModelRequirement::MaxTokens(max_tokens));
    }
    if let Some(seed) = requirements.seed {
        list.push(ModelRequirement::Seed(seed));
    }
    list.into_iter()
        .map(|requirement| Command::Model { requirement })
        .collect()
}

impl CommandParser for ModelCommandParser {
    fn name(&self) -> &'static str {
        "MODEL"
    }

    fn command_type(&self) -> &'static str {
        "MODEL"
    }

    fn description(&self) -> &'static str {
        "Requirement on the model, in the head it is the default for every prompt"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead, UsagePlace::PipelineTask]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "MODEL VARIANT Chat",
            "MODEL VARIANT Completion",
            "MODEL NAME gpt-4",
            "MODEL NAME `claude-3-opus-20240229`",
            "MODEL TEMPERATURE 0.5",
            "MODEL MAX TOKENS 1000",
            "MODEL SEED 42",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        let value = args
            .pop_back()
            .ok_or_else(|| ParseError::missing("model requirement"))?;
        if args.is_empty() {
            return Err(ParseError::missing("model requirement value"));
        }

        let key = normalize_to_screaming_case(&args.into_iter().collect::<Vec<_>>().join(" "));
        let requirement = parse_requirement(&key, &value)?;

        Ok(Command::Model { requirement })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        let Command::Model { requirement } = command else {
            return None;
        };

        Some(match requirement {
            ModelRequirement::Variant(variant) => format!("MODEL VARIANT {}", variant.as_str()),
            ModelRequirement::Name(name) => format!("MODEL NAME {}", name),
            ModelRequirement::Temperature(t) => format!("MODEL TEMPERATURE {}", t),
            ModelRequirement::MaxTokens(m) => format!("MODEL MAX TOKENS {}", m),
            ModelRequirement::Seed(seed) => format!("MODEL SEED {}", seed),
        })
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Model { requirement } = command else {
            return Err(foreign_command(self, command));
        };

        let requirements = pipeline
            .default_model_requirements
            .get_or_insert_with(ModelRequirements::default);
        merge_requirement(requirements, requirement, "the pipeline head")
    }

    fn apply_to_task(
        &self,
        command: &Command,
        task: &mut TaskBuilder,
        _pipeline: &mut PipelineBuilder,
    ) -> ApplyResult<()> {
        let Command::Model { requirement } = command else {
            return Err(foreign_command(self, command));
        };

        let scope = format!("the task \"{}\"", task.title);
        let requirements = task
            .model_requirements
            .get_or_insert_with(ModelRequirements::default);
        merge_requirement(requirements, requirement, &scope)
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .default_model_requirements
            .as_ref()
            .map(requirements_to_commands)
            .unwrap_or_default()
    }

    fn take_from_task(&self, task: &TaskJson) -> Vec<Command> {
        task.model_requirements
            .as_ref()
            .map(requirements_to_commands)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    fn parse(line: &str) -> Result<Command> {
        parse_command(line, UsagePlace::PipelineTask)
    }

    #[test]
    fn test_parse_requirements() {
        assert_eq!(
            parse("MODEL MAX TOKENS 1000").unwrap(),
            Command::Model {
                requirement: ModelRequirement::MaxTokens(1000)
            }
        );
        assert_eq!(
            parse("MODEL NAME `gpt-4`").unwrap(),
            Command::Model {
                requirement: ModelRequirement::Name("gpt-4".to_string())
            }
        );
        assert_eq!(
            parse("model variant chat").unwrap(),
            Command::Model {
                requirement: ModelRequirement::Variant(ModelVariant::Chat)
            }
        );
    }

    #[test]
    fn test_invalid_requirements() {
        assert!(parse("MODEL VARIANT Embedding").is_err());
        assert!(parse("MODEL TEMPERATURE 3").is_err());
        assert!(parse("MODEL COLOR red").is_err());
        assert!(parse("MODEL gpt-4").is_err());
    }

    #[test]
    fn test_redefinition_in_task() {
        let parser = ModelCommandParser;
        let mut pipeline = PipelineBuilder::new("Test");
        let mut task = TaskBuilder::new("t", "T");

        let gpt = parse("MODEL NAME gpt-4").unwrap();
        let claude = parse("MODEL NAME claude-3").unwrap();

        parser.apply_to_task(&gpt, &mut task, &mut pipeline).unwrap();
        parser.apply_to_task(&gpt, &mut task, &mut pipeline).unwrap();
        assert!(parser.apply_to_task(&claude, &mut task, &mut pipeline).is_err());
    }

    #[test]
    fn test_head_defaults() {
        let parser = ModelCommandParser;
        let mut pipeline = PipelineBuilder::new("Test");
        parser
            .apply_to_pipeline(&parse("MODEL TEMPERATURE 0.7").unwrap(), &mut pipeline)
            .unwrap();

        assert_eq!(
            pipeline.default_model_requirements.unwrap().temperature,
            Some(0.7)
        );
    }
}
