//! Extraction of list items, code blocks and blockquotes

use super::{FenceLine, FenceTracker};
use crate::error::{ParseError, Result};
use regex::Regex;
use std::sync::LazyLock;

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").expect("valid regex"));

/// A fenced code block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info string after the opening fence, e.g. `javascript`
    pub language: Option<String>,
    pub content: String,
}

/// Return the text of a list item line (`- x`, `* x`, `+ x`, `1. x`, `1) x`)
pub fn list_item_text(line: &str) -> Option<&str> {
    LIST_ITEM
        .captures(line)
        .and_then(|captures| captures.get(1))
        .map(|text| text.as_str().trim())
        .filter(|text| !text.is_empty())
}

/// Collect list items outside fenced code blocks
pub fn extract_all_list_items(markdown: &str) -> Vec<String> {
    let mut fences = FenceTracker::new();
    let mut items = Vec::new();

    for line in markdown.lines() {
        if fences.classify(line) == FenceLine::Outside {
            if let Some(text) = list_item_text(line) {
                items.push(text.to_string());
            }
        }
    }

    items
}

/// Collect fenced code blocks, an unterminated block runs to the end
pub fn extract_all_code_blocks(markdown: &str) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut current: Option<(Option<String>, Vec<&str>)> = None;
    let mut fences = FenceTracker::new();

    for line in markdown.lines() {
        match fences.classify(line) {
            FenceLine::Open(fence) => {
                let language = fence
                    .info(line)
                    .split_whitespace()
                    .next()
                    .map(|word| word.to_lowercase());
                current = Some((language, Vec::new()));
            }
            FenceLine::Close => {
                if let Some((language, lines)) = current.take() {
                    blocks.push(CodeBlock {
                        language,
                        content: lines.join("\n"),
                    });
                }
            }
            FenceLine::Inside => {
                if let Some((_, lines)) = current.as_mut() {
                    lines.push(line);
                }
            }
            FenceLine::Outside => {}
        }
    }

    if let Some((language, lines)) = current {
        blocks.push(CodeBlock {
            language,
            content: lines.join("\n"),
        });
    }

    blocks
}

/// Extract the only code block of the markdown
pub fn extract_one_code_block(markdown: &str) -> Result<CodeBlock> {
    let mut blocks = extract_all_code_blocks(markdown);
    match blocks.len() {
        1 => Ok(blocks.remove(0)),
        count => Err(ParseError::InvalidValue {
            field: "code block".to_string(),
            message: format!("Expected exactly one code block, found {}", count),
        }),
    }
}

/// Join the blockquote lines outside fenced code blocks
pub fn extract_blockquote(markdown: &str) -> Option<String> {
    let mut fences = FenceTracker::new();
    let mut lines = Vec::new();

    for line in markdown.lines() {
        if fences.classify(line) == FenceLine::Outside {
            if let Some(quoted) = line.trim_start().strip_prefix('>') {
                lines.push(quoted.strip_prefix(' ').unwrap_or(quoted));
            }
        }
    }

    let quote = lines.join("\n").trim().to_string();
    if quote.is_empty() {
        None
    } else {
        Some(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_item_markers() {
        assert_eq!(list_item_text("- PARAMETER {x}"), Some("PARAMETER {x}"));
        assert_eq!(list_item_text("* JOKER {y}"), Some("JOKER {y}"));
        assert_eq!(list_item_text("+ MODEL NAME gpt-4"), Some("MODEL NAME gpt-4"));
        assert_eq!(list_item_text("1. EXPECT MAX 5 WORDS"), Some("EXPECT MAX 5 WORDS"));
        assert_eq!(list_item_text("2) FORMAT JSON"), Some("FORMAT JSON"));
        assert_eq!(list_item_text("-> {result}"), None);
        assert_eq!(list_item_text("plain text"), None);
    }

    #[test]
    fn test_list_items_skip_code_blocks() {
        let markdown = "- A\n```\n- not an item\n```\n- B";
        assert_eq!(extract_all_list_items(markdown), vec!["A", "B"]);
    }

    #[test]
    fn test_code_blocks() {
        let markdown = "Text\n```JavaScript\nconst a = 1;\nreturn a;\n```\n\n```\nplain\n```";
        let blocks = extract_all_code_blocks(markdown);

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].language.as_deref(), Some("javascript"));
        assert_eq!(blocks[0].content, "const a = 1;\nreturn a;");
        assert_eq!(blocks[1].language, None);

        assert!(extract_one_code_block(markdown).is_err());
        assert_eq!(extract_one_code_block("```\nx\n```").unwrap().content, "x");
    }

    #[test]
    fn test_nested_fence_is_one_code_block() {
        let markdown = "````md\n```js\n- not an item\n```\n````\n- after";
        let block = extract_one_code_block(markdown).unwrap();

        assert_eq!(block.language.as_deref(), Some("md"));
        assert_eq!(block.content, "```js\n- not an item\n```");
        assert_eq!(extract_all_list_items(markdown), vec!["after"]);
    }

    #[test]
    fn test_blockquote() {
        let markdown = "Description\n\n> Write a poem\n>\n> about {topic}";
        assert_eq!(
            extract_blockquote(markdown).as_deref(),
            Some("Write a poem\n\nabout {topic}")
        );
        assert_eq!(extract_blockquote("No quote"), None);
    }
}
