//! Book parser
//!
//! Reads a whole book into its head and sections. Command lines are kept as
//! written so the assembler can report them next to the state they
//! conflict with.

use crate::command::{parse_command, UsagePlace};
use crate::error::{ParseError, Result};
use crate::markdown::{
    flatten_markdown, is_flat_book, remove_markdown_comments, sectionize,
    unwrap_backticked_parameters, wrap_flat_book, MarkdownSection, SectionBody,
};
use log::debug;
use promptbook_core::naming::title_to_name;
use promptbook_core::Command;

/// A command line together with the command it was parsed into
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub raw: String,
    pub command: Command,
}

/// The `#` head of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookHead {
    pub title: String,
    pub description: Option<String>,
    pub command_lines: Vec<String>,
}

/// One `##` section of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSection {
    pub title: String,
    /// Kebab-case name derived from the title
    pub name: String,
    pub description: Option<String>,
    pub content: String,
    pub content_language: Option<String>,
    pub resulting_parameter_name: Option<String>,
    pub command_lines: Vec<String>,
}

/// A book split into its parts, commands not yet applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDocument {
    pub head: BookHead,
    pub sections: Vec<BookSection>,
    /// The book as it was passed in
    pub source: String,
}

/// Book parser
pub struct BookParser;

impl BookParser {
    /// Parse a book into its head and sections
    pub fn parse(book: &str) -> Result<BookDocument> {
        let markdown = Self::preprocess(book)?;
        let sections = sectionize(&markdown)?;

        let head = Self::parse_head(&sections.head);
        let sections = sections
            .sections
            .iter()
            .map(Self::parse_section)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Parsed book \"{}\" with {} sections",
            head.title,
            sections.len()
        );

        Ok(BookDocument {
            head,
            sections,
            source: book.to_string(),
        })
    }

    /// Normalize the raw text into a flattened, comment free book
    pub fn preprocess(book: &str) -> Result<String> {
        let mut markdown = remove_markdown_comments(book);
        if is_flat_book(&markdown) {
            debug!("Book has no headings, wrapping it as a single prompt");
            markdown = wrap_flat_book(&markdown);
        }
        let markdown = unwrap_backticked_parameters(&markdown);
        flatten_markdown(&markdown)
    }

    /// Parse command lines written in the given place
    pub fn parse_commands(lines: &[String], place: UsagePlace) -> Result<Vec<ParsedCommand>> {
        lines
            .iter()
            .map(|raw| {
                Ok(ParsedCommand {
                    raw: raw.clone(),
                    command: parse_command(raw, place)?,
                })
            })
            .collect()
    }

    fn parse_head(section: &MarkdownSection) -> BookHead {
        let body = SectionBody::analyze(&section.content);

        BookHead {
            title: section.title.clone(),
            description: body.prose,
            command_lines: body.list_items,
        }
    }

    fn parse_section(section: &MarkdownSection) -> Result<BookSection> {
        let body = SectionBody::analyze(&section.content);
        let (content, content_language) =
            body.content().map_err(|error| ParseError::InvalidSection {
                section: section.title.clone(),
                message: error.to_string(),
            })?;

        Ok(BookSection {
            title: section.title.clone(),
            name: title_to_name(&section.title),
            description: body.description(),
            content,
            content_language,
            resulting_parameter_name: body.resulting_parameter_name.clone(),
            command_lines: body.list_items,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_parts() {
        let book = "# Write a poem\n\nWrites a poem.\n\n- PARAMETER {topic} Topic of the poem\n\n## Write\n\nA short comment.\n\n```\nWrite a poem about {topic}\n```\n\n- MODEL VARIANT Chat\n\n-> {poem}\n";
        let document = BookParser::parse(book).unwrap();

        assert_eq!(document.head.title, "Write a poem");
        assert_eq!(document.head.description.as_deref(), Some("Writes a poem."));
        assert_eq!(
            document.head.command_lines,
            vec!["PARAMETER {topic} Topic of the poem"]
        );

        let section = &document.sections[0];
        assert_eq!(section.name, "write");
        assert_eq!(section.content, "Write a poem about {topic}");
        assert_eq!(section.description.as_deref(), Some("A short comment."));
        assert_eq!(section.resulting_parameter_name.as_deref(), Some("poem"));
        assert_eq!(section.command_lines, vec!["MODEL VARIANT Chat"]);
        assert_eq!(document.source, book);
    }

    #[test]
    fn test_flat_book_is_wrapped() {
        let document = BookParser::parse("Tell me a joke about {topic}\n-> {joke}").unwrap();

        assert_eq!(document.head.title, "Untitled");
        assert_eq!(document.sections.len(), 1);
        assert_eq!(document.sections[0].content, "Tell me a joke about {topic}");
        assert_eq!(
            document.sections[0].resulting_parameter_name.as_deref(),
            Some("joke")
        );
    }

    #[test]
    fn test_two_code_blocks_are_rejected() {
        let book = "# T\n\n## Twice\n\n```\na\n```\n\n```\nb\n```\n";
        let error = BookParser::parse(book).unwrap_err();
        assert!(matches!(error, ParseError::InvalidSection { .. }));
    }

    #[test]
    fn test_parse_commands_reports_the_line() {
        let lines = vec!["PERSONA Jane".to_string(), "FLY AWAY".to_string()];
        let error = BookParser::parse_commands(&lines, UsagePlace::PipelineHead).unwrap_err();
        assert!(error.to_string().contains("FLY AWAY"));
    }
}
