//! Section body analysis
//!
//! A section body mixes free text, command list items, at most one code block
//! or a blockquote holding the task content, and a closing `-> {name}` return
//! marker.

use super::blocks::{
    extract_all_code_blocks, extract_all_list_items, extract_blockquote, list_item_text, CodeBlock,
};
use super::{FenceLine, FenceTracker};
use crate::error::{ParseError, Result};
use regex::Regex;
use std::sync::LazyLock;

static RETURN_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^->\s*\{([A-Za-z0-9_]+)\}").expect("valid regex"));

/// Parts of a section body
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionBody {
    /// Text outside lists, code blocks, blockquotes and the return marker
    pub prose: Option<String>,
    pub code_blocks: Vec<CodeBlock>,
    pub quote: Option<String>,
    pub list_items: Vec<String>,
    pub resulting_parameter_name: Option<String>,
}

/// Name in a `-> {name}` return marker line
pub fn return_marker_name(line: &str) -> Option<&str> {
    RETURN_MARKER
        .captures(line.trim())
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

impl SectionBody {
    pub fn analyze(markdown: &str) -> Self {
        let mut fences = FenceTracker::new();
        let mut prose_lines: Vec<&str> = Vec::new();
        let mut resulting_parameter_name = None;

        for line in markdown.lines() {
            if fences.classify(line) != FenceLine::Outside || list_item_text(line).is_some() {
                continue;
            }
            if line.trim_start().starts_with('>') {
                continue;
            }
            if line.trim_start().starts_with("->") {
                if let Some(name) = return_marker_name(line) {
                    resulting_parameter_name = Some(name.to_string());
                }
                continue;
            }
            prose_lines.push(line);
        }

        let prose = prose_lines.join("\n").trim().to_string();

        SectionBody {
            prose: (!prose.is_empty()).then_some(prose),
            code_blocks: extract_all_code_blocks(markdown),
            quote: extract_blockquote(markdown),
            list_items: extract_all_list_items(markdown),
            resulting_parameter_name,
        }
    }

    /// Task content and its language
    ///
    /// The code block wins over the blockquote, the blockquote over the prose.
    pub fn content(&self) -> Result<(String, Option<String>)> {
        if self.code_blocks.len() > 1 {
            return Err(ParseError::invalid_value(
                "content",
                format!(
                    "A section can contain at most one code block, found {}",
                    self.code_blocks.len()
                ),
            ));
        }

        if let Some(block) = self.code_blocks.first() {
            return Ok((block.content.trim().to_string(), block.language.clone()));
        }
        if let Some(quote) = &self.quote {
            return Ok((quote.clone(), None));
        }
        Ok((self.prose.clone().unwrap_or_default(), None))
    }

    /// Description of the section, absent when the prose is the content
    pub fn description(&self) -> Option<String> {
        if self.code_blocks.is_empty() && self.quote.is_none() {
            None
        } else {
            self.prose.clone()
        }
    }
}
