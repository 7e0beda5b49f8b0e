//! Sectionizer
//!
//! Splits a book into heading-delimited sections. Headings inside fenced code
//! blocks and inside unterminated `<!--` comments never start a section.

use super::{FenceLine, FenceTracker};
use crate::error::{ParseError, Result};
use promptbook_core::constants::DEFAULT_BOOK_TITLE;

/// State of the line scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Markdown,
    CodeBlock,
    Comment,
}

/// A heading with everything below it up to the next heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownSection {
    pub title: String,
    /// Heading level, 1 for `#`
    pub level: usize,
    pub content: String,
}

/// Head section and task sections of a book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSections {
    pub head: MarkdownSection,
    pub sections: Vec<MarkdownSection>,
}

/// Level of an ATX heading line (`## Title` is 2)
pub fn heading_level(line: &str) -> Option<usize> {
    let trimmed = line.trim();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }

    let rest = &trimmed[level..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some(level)
    } else {
        None
    }
}

fn finish_section(buffer: &mut Vec<&str>, sections: &mut Vec<String>) {
    let section = buffer.join("\n");
    buffer.clear();

    let section = section.trim();
    if section.is_empty() {
        return;
    }

    if section.starts_with('#') {
        sections.push(section.to_string());
    } else {
        sections.push(format!("# {}\n\n{}", DEFAULT_BOOK_TITLE, section));
    }
}

/// Split markdown into sections, each starting with its heading
///
/// Content before the first heading becomes a section titled `# Untitled`.
pub fn split_into_sections(markdown: &str) -> Vec<String> {
    let mut sections = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();
    let mut state = ScanState::Markdown;
    let mut fences = FenceTracker::new();

    for line in markdown.lines() {
        let trimmed = line.trim();

        match state {
            ScanState::Markdown => {
                if let FenceLine::Open(_) = fences.classify(trimmed) {
                    state = ScanState::CodeBlock;
                } else if trimmed.starts_with("<!--") && !trimmed.contains("-->") {
                    state = ScanState::Comment;
                } else if heading_level(trimmed).is_some() {
                    finish_section(&mut buffer, &mut sections);
                }
            }
            ScanState::CodeBlock => {
                if fences.classify(trimmed) == FenceLine::Close {
                    state = ScanState::Markdown;
                }
            }
            ScanState::Comment => {
                if trimmed.contains("-->") {
                    state = ScanState::Markdown;
                }
            }
        }

        buffer.push(line);
    }

    finish_section(&mut buffer, &mut sections);
    sections
}

/// Parse one section produced by [`split_into_sections`]
pub fn parse_markdown_section(section: &str) -> Result<MarkdownSection> {
    let section = section.trim();
    let (heading, content) = section.split_once('\n').unwrap_or((section, ""));

    let level = heading_level(heading).ok_or_else(|| {
        ParseError::Structure(format!(
            "Markdown section must start with a heading:\n\n{}",
            section
        ))
    })?;

    Ok(MarkdownSection {
        title: heading.trim()[level..].trim().to_string(),
        level,
        content: content.trim().to_string(),
    })
}

/// Normalize heading levels
///
/// The first section becomes the `#` head, every following section becomes a
/// `##` section whatever its original depth.
pub fn flatten_markdown(markdown: &str) -> Result<String> {
    let sections = split_into_sections(markdown);
    let mut flattened = Vec::with_capacity(sections.len());

    for (index, section) in sections.iter().enumerate() {
        let section = parse_markdown_section(section)?;
        let hashes = if index == 0 { "#" } else { "##" };

        if section.content.is_empty() {
            flattened.push(format!("{} {}", hashes, section.title));
        } else {
            flattened.push(format!("{} {}\n\n{}", hashes, section.title, section.content));
        }
    }

    Ok(flattened.join("\n\n"))
}

/// Split a book into its head and task sections, checking heading levels
pub fn sectionize(markdown: &str) -> Result<BookSections> {
    let mut parsed = split_into_sections(markdown)
        .iter()
        .map(|section| parse_markdown_section(section))
        .collect::<Result<Vec<_>>>()?
        .into_iter();

    let head = parsed.next().ok_or_else(|| {
        ParseError::Structure("Book is empty, it must contain at least the `#` head".to_string())
    })?;

    if head.level != 1 {
        return Err(ParseError::Structure(format!(
            "Book must start with a level 1 heading, found level {} heading \"{}\"",
            head.level, head.title
        )));
    }

    let sections: Vec<MarkdownSection> = parsed.collect();
    if let Some(section) = sections.iter().find(|s| s.level != 2) {
        return Err(ParseError::Structure(format!(
            "Sections of a book must be level 2 headings, found level {} heading \"{}\"",
            section.level, section.title
        )));
    }

    Ok(BookSections { head, sections })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("# Title"), Some(1));
        assert_eq!(heading_level("### Deep"), Some(3));
        assert_eq!(heading_level("#hashtag"), None);
        assert_eq!(heading_level("####### Too deep"), None);
        assert_eq!(heading_level("Not a heading"), None);
    }

    #[test]
    fn test_split_into_sections() {
        let markdown = "# Book\n\nIntro\n\n## First\n\nA\n\n## Second\n\nB";
        let sections = split_into_sections(markdown);

        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0], "# Book\n\nIntro");
        assert_eq!(sections[2], "## Second\n\nB");
    }

    #[test]
    fn test_leading_content_is_untitled() {
        let sections = split_into_sections("Some intro\n\n## Task\n\nDo it");
        assert_eq!(sections[0], "# Untitled\n\nSome intro");
    }

    #[test]
    fn test_heading_inside_code_block_is_ignored() {
        let markdown = "# Book\n\n## Script\n\n```python\n# comment, not a heading\nx = 1\n```\n\n-> {x}";
        let sections = split_into_sections(markdown);

        assert_eq!(sections.len(), 2);
        assert!(sections[1].contains("# comment, not a heading"));
    }

    #[test]
    fn test_heading_inside_nested_fence_is_ignored() {
        let markdown = "# T\n\n## Do\n\n````md\n```\n## Inner\n```\n````\n\n-> {y}";
        let sections = split_into_sections(markdown);

        assert_eq!(sections.len(), 2);
        assert!(sections[1].contains("## Inner"));
        assert!(sections[1].ends_with("-> {y}"));
    }

    #[test]
    fn test_heading_inside_comment_is_ignored() {
        let markdown = "# Book\n\n<!--\n## Hidden\n-->\n\n## Visible\n\nText";
        let sections = split_into_sections(markdown);

        assert_eq!(sections.len(), 2);
        assert!(sections[0].contains("## Hidden"));
    }

    #[test]
    fn test_parse_markdown_section() {
        let section = parse_markdown_section("## Write a poem\n\nAbout {topic}").unwrap();
        assert_eq!(section.title, "Write a poem");
        assert_eq!(section.level, 2);
        assert_eq!(section.content, "About {topic}");

        assert!(parse_markdown_section("no heading").is_err());
    }

    #[test]
    fn test_flatten_markdown() {
        let markdown = "## Not a head\n\nA\n\n### Deep\n\nB\n\n# Top\n\nC";
        assert_eq!(
            flatten_markdown(markdown).unwrap(),
            "# Not a head\n\nA\n\n## Deep\n\nB\n\n## Top\n\nC"
        );
    }

    #[test]
    fn test_sectionize_rejects_bad_levels() {
        assert!(sectionize("## Head\n\n## Task").is_err());
        assert!(sectionize("# Head\n\n### Task").is_err());
        assert!(sectionize("").is_err());

        let sections = sectionize("# Head\n\n## A\n\n## B").unwrap();
        assert_eq!(sections.head.title, "Head");
        assert_eq!(sections.sections.len(), 2);
    }
}
