//! `KNOWLEDGE` command

use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyResult, ParseError, Result};
use log::debug;
use promptbook_core::model::KnowledgeSourceJson;
use promptbook_core::naming::normalize_to_kebab_case;
use promptbook_core::{Command, PipelineBuilder, PipelineJson};
use sha2::{Digest, Sha256};

/// Derive a stable name for a knowledge source from its content
///
/// The name is made of a readable prefix of the source and a sha256 prefix,
/// identical sources always get identical names.
pub fn knowledge_source_name(content: &str) -> String {
    let hash = hex::encode(Sha256::digest(content.as_bytes()));
    let semantic: String = content.chars().take(20).collect();
    let semantic = normalize_to_kebab_case(&semantic);

    [String::from("source"), semantic, hash[..20].to_string()]
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Registers a source of knowledge for the pipeline
pub struct KnowledgeCommandParser;

impl CommandParser for KnowledgeCommandParser {
    fn name(&self) -> &'static str {
        "KNOWLEDGE"
    }

    fn command_type(&self) -> &'static str {
        "KNOWLEDGE"
    }

    fn description(&self) -> &'static str {
        "Source of knowledge the pipeline can use, a URL, a file path or an inline text"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "KNOWLEDGE https://www.pavolhejny.com/",
            "KNOWLEDGE ./hejny-cv.pdf",
            "KNOWLEDGE Pavol Hejný has a PhD in mathematics education",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let content = input.raw_args.trim();
        if content.is_empty() {
            return Err(ParseError::missing("knowledge source"));
        }
        if content.starts_with("http://") {
            return Err(ParseError::invalid_value(
                "knowledge source",
                format!("Source \"{}\" is not secure, use https", content),
            ));
        }

        Ok(Command::Knowledge {
            knowledge_source_content: content.to_string(),
        })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Knowledge {
                knowledge_source_content,
            } => Some(format!("KNOWLEDGE {}", knowledge_source_content)),
            _ => None,
        }
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Knowledge {
            knowledge_source_content,
        } = command
        else {
            return Err(foreign_command(self, command));
        };

        if pipeline
            .knowledge_sources
            .iter()
            .any(|source| &source.knowledge_source_content == knowledge_source_content)
        {
            debug!("Knowledge source is already registered, skipping the duplicate");
            return Ok(());
        }

        pipeline.knowledge_sources.push(KnowledgeSourceJson {
            name: knowledge_source_name(knowledge_source_content),
            knowledge_source_content: knowledge_source_content.clone(),
        });
        Ok(())
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .knowledge_sources
            .iter()
            .map(|source| Command::Knowledge {
                knowledge_source_content: source.knowledge_source_content.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parse_command;

    #[test]
    fn test_source_name_is_stable() {
        let name = knowledge_source_name("https://www.pavolhejny.com/");
        assert!(name.starts_with("source-https-www-pavolhej-"));
        assert_eq!(name, knowledge_source_name("https://www.pavolhejny.com/"));
        assert_ne!(name, knowledge_source_name("https://www.pavolhejny.com/cv"));
    }

    #[test]
    fn test_insecure_source_is_rejected() {
        let error = parse_command("KNOWLEDGE http://example.com", UsagePlace::PipelineHead).unwrap_err();
        assert!(error.to_string().contains("not secure"));
    }

    #[test]
    fn test_duplicate_sources_are_merged() {
        let parser = KnowledgeCommandParser;
        let mut pipeline = PipelineBuilder::new("Test");
        let command = parse_command("KNOWLEDGE ./notes.md", UsagePlace::PipelineHead).unwrap();

        parser.apply_to_pipeline(&command, &mut pipeline).unwrap();
        parser.apply_to_pipeline(&command, &mut pipeline).unwrap();
        assert_eq!(pipeline.knowledge_sources.len(), 1);
    }
}
