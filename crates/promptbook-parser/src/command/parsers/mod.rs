//! Built-in command parsers, one per command

mod action;
mod book_version;
mod expect;
mod foreach;
mod format;
mod formfactor;
mod instrument;
mod joker;
mod knowledge;
mod model;
mod parameter;
mod persona;
mod postprocess;
mod section;
mod url;

pub use action::ActionCommandParser;
pub use book_version::BookVersionCommandParser;
pub use expect::ExpectCommandParser;
pub use foreach::ForeachCommandParser;
pub use format::FormatCommandParser;
pub use formfactor::FormfactorCommandParser;
pub use instrument::InstrumentCommandParser;
pub use joker::JokerCommandParser;
pub use knowledge::{knowledge_source_name, KnowledgeCommandParser};
pub use model::ModelCommandParser;
pub use parameter::ParameterCommandParser;
pub use persona::PersonaCommandParser;
pub use postprocess::PostprocessCommandParser;
pub use section::SectionCommandParser;
pub use url::UrlCommandParser;

use super::CommandParser;
use crate::error::{ParseError, Result};
use std::collections::VecDeque;

/// Every built-in parser, in documentation order
pub static COMMAND_PARSERS: &[&dyn CommandParser] = &[
    &BookVersionCommandParser,
    &UrlCommandParser,
    &FormfactorCommandParser,
    &ParameterCommandParser,
    &PersonaCommandParser,
    &KnowledgeCommandParser,
    &SectionCommandParser,
    &ModelCommandParser,
    &ExpectCommandParser,
    &FormatCommandParser,
    &JokerCommandParser,
    &PostprocessCommandParser,
    &ForeachCommandParser,
    &ActionCommandParser,
    &InstrumentCommandParser,
];

/// Take the next argument or fail naming the missing one
pub(crate) fn next_arg(args: &mut VecDeque<String>, field: &str) -> Result<String> {
    args.pop_front().ok_or_else(|| ParseError::missing(field))
}

/// Fail when arguments are left over
pub(crate) fn expect_no_more_args(args: &VecDeque<String>) -> Result<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(ParseError::invalid_value(
            "arguments",
            format!(
                "Unexpected extra arguments: {}",
                args.iter().cloned().collect::<Vec<_>>().join(" ")
            ),
        ))
    }
}
