//! `URL` command

use super::{expect_no_more_args, next_arg};
use crate::command::parser::foreign_command;
use crate::command::{CommandInput, CommandParser, UsagePlace};
use crate::error::{ApplyError, ApplyResult, ParseError, Result};
use promptbook_core::{Command, PipelineBuilder, PipelineJson};

/// Check that the text is a canonical pipeline URL
fn validate_pipeline_url(url: &str) -> std::result::Result<(), String> {
    if url.starts_with("http://") {
        return Err("Pipeline URL must use https, http is not secure".to_string());
    }
    let Some(rest) = url.strip_prefix("https://") else {
        return Err("Pipeline URL must start with https://".to_string());
    };

    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() || !host.contains('.') {
        return Err(format!("\"{}\" is not a valid host", host));
    }
    if url.chars().any(char::is_whitespace) {
        return Err("Pipeline URL can not contain whitespace".to_string());
    }
    if url.contains('#') {
        return Err("Pipeline URL can not contain a #fragment".to_string());
    }
    if url.contains('?') {
        return Err("Pipeline URL can not contain a ?query".to_string());
    }

    Ok(())
}

/// Declares the canonical URL of the pipeline
pub struct UrlCommandParser;

impl CommandParser for UrlCommandParser {
    fn name(&self) -> &'static str {
        "URL"
    }

    fn command_type(&self) -> &'static str {
        "URL"
    }

    fn alias_names(&self) -> &'static [&'static str] {
        &["PIPELINE_URL"]
    }

    fn deprecated_names(&self) -> &'static [&'static str] {
        &["PTBK_URL", "PROMPTBOOK_URL"]
    }

    fn description(&self) -> &'static str {
        "Canonical https URL identifying the pipeline"
    }

    fn usage_places(&self) -> &'static [UsagePlace] {
        &[UsagePlace::PipelineHead]
    }

    fn examples(&self) -> &'static [&'static str] {
        &[
            "URL https://promptbook.studio/library/write-cv.book",
            "PIPELINE URL https://example.com/books/translate.book",
        ]
    }

    fn parse(&self, input: CommandInput) -> Result<Command> {
        let mut args = input.args;
        let url = next_arg(&mut args, "url")?;
        expect_no_more_args(&args)?;

        validate_pipeline_url(&url).map_err(|message| ParseError::invalid_value("url", message))?;

        Ok(Command::Url { pipeline_url: url })
    }

    fn stringify(&self, command: &Command) -> Option<String> {
        match command {
            Command::Url { pipeline_url } => Some(format!("URL {}", pipeline_url)),
            _ => None,
        }
    }

    fn apply_to_pipeline(&self, command: &Command, pipeline: &mut PipelineBuilder) -> ApplyResult<()> {
        let Command::Url { pipeline_url } = command else {
            return Err(foreign_command(self, command));
        };

        match &pipeline.pipeline_url {
            Some(existing) if existing != pipeline_url => Err(ApplyError::redefinition(
                "Pipeline URL",
                existing,
                pipeline_url,
            )),
            _ => {
                pipeline.pipeline_url = Some(pipeline_url.clone());
                Ok(())
            }
        }
    }

    fn take_from_pipeline(&self, pipeline: &PipelineJson) -> Vec<Command> {
        pipeline
            .pipeline_url
            .iter()
            .map(|url| Command::Url {
                pipeline_url: url.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_pipeline_url() {
        assert!(validate_pipeline_url("https://promptbook.studio/library/write-cv.book").is_ok());
        assert!(validate_pipeline_url("http://promptbook.studio/x.book").is_err());
        assert!(validate_pipeline_url("https://localhost/x.book").is_err());
        assert!(validate_pipeline_url("https://example.com/x.book#part").is_err());
        assert!(validate_pipeline_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_url_set_once() {
        let parser = UrlCommandParser;
        let mut pipeline = PipelineBuilder::new("Test");

        parser
            .apply_to_pipeline(
                &Command::Url {
                    pipeline_url: "https://example.com/a.book".to_string(),
                },
                &mut pipeline,
            )
            .unwrap();
        let error = parser
            .apply_to_pipeline(
                &Command::Url {
                    pipeline_url: "https://example.com/b.book".to_string(),
                },
                &mut pipeline,
            )
            .unwrap_err();

        assert!(error.to_string().contains("already defined"));
    }
}
