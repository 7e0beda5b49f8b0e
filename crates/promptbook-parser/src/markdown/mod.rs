//! Markdown utilities
//!
//! Books are plain markdown. This module turns the text into sections and
//! section bodies without interpreting any command.

pub mod blocks;
pub mod body;
pub mod preprocess;
pub mod sections;

pub use blocks::{
    extract_all_code_blocks, extract_all_list_items, extract_blockquote, extract_one_code_block,
    CodeBlock,
};
pub use body::{return_marker_name, SectionBody};
pub use preprocess::{
    is_flat_book, remove_markdown_comments, unwrap_backticked_parameters, wrap_flat_book,
};
pub use sections::{
    flatten_markdown, parse_markdown_section, sectionize, split_into_sections, BookSections,
    MarkdownSection,
};

/// Opening fence of a code block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Fence {
    marker: char,
    length: usize,
}

impl Fence {
    /// Fence opened by the line, a run of at least three backticks or tildes
    pub(crate) fn open(line: &str) -> Option<Fence> {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let length = trimmed.chars().take_while(|c| *c == marker).count();
        (length >= 3).then_some(Fence { marker, length })
    }

    /// A closer is a bare run of the same marker at least as long as the opener
    pub(crate) fn is_closed_by(&self, line: &str) -> bool {
        let trimmed = line.trim();
        let length = trimmed.chars().take_while(|c| *c == self.marker).count();
        length >= self.length && length == trimmed.chars().count()
    }

    /// Info string of an opening line, e.g. `javascript`
    pub(crate) fn info<'a>(&self, line: &'a str) -> &'a str {
        line.trim().trim_start_matches(self.marker).trim()
    }
}

/// Position of a line relative to fenced code blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FenceLine {
    Open(Fence),
    Close,
    Inside,
    Outside,
}

/// Line scanner that knows whether it is inside a fenced code block
#[derive(Debug, Clone, Default)]
pub(crate) struct FenceTracker {
    open: Option<Fence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn classify(&mut self, line: &str) -> FenceLine {
        match self.open {
            Some(fence) if fence.is_closed_by(line) => {
                self.open = None;
                FenceLine::Close
            }
            Some(_) => FenceLine::Inside,
            None => match Fence::open(line) {
                Some(fence) => {
                    self.open = Some(fence);
                    FenceLine::Open(fence)
                }
                None => FenceLine::Outside,
            },
        }
    }
}
