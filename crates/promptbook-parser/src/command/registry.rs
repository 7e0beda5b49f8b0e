//! Command parser registry and dispatch
//!
//! The name table is built once and only read afterwards.

use super::input::{normalize_command_text, CommandLine};
use super::parsers::COMMAND_PARSERS;
use super::{CommandParser, UsagePlace};
use crate::error::{ParseError, Result};
use log::{debug, warn};
use promptbook_core::naming::normalize_to_screaming_case;
use promptbook_core::Command;
use std::collections::HashMap;
use std::sync::LazyLock;

static REGISTRY: LazyLock<CommandRegistry> =
    LazyLock::new(|| CommandRegistry::new(COMMAND_PARSERS));

/// Lookup table from command names to their parsers
pub struct CommandRegistry {
    parsers: Vec<&'static dyn CommandParser>,
    names: HashMap<String, Vec<usize>>,
}

impl CommandRegistry {
    pub fn new(parsers: &[&'static dyn CommandParser]) -> Self {
        let mut names: HashMap<String, Vec<usize>> = HashMap::new();

        for (index, parser) in parsers.iter().enumerate() {
            for name in parser.all_names() {
                let entry = names.entry(normalize_command_text(name)).or_default();
                if !entry.contains(&index) {
                    entry.push(index);
                }
            }
        }

        Self {
            parsers: parsers.to_vec(),
            names,
        }
    }

    /// The registry of every built-in command
    pub fn global() -> &'static CommandRegistry {
        &REGISTRY
    }

    pub fn parsers(&self) -> &[&'static dyn CommandParser] {
        &self.parsers
    }

    /// Parsers recognizing the name in the given place
    pub fn lookup(&self, name: &str, place: UsagePlace) -> Vec<&'static dyn CommandParser> {
        self.names
            .get(name)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|index| self.parsers[*index])
                    .filter(|parser| parser.is_usable_in(place))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The parser owning the command
    pub fn parser_for(&self, command: &Command) -> Option<&'static dyn CommandParser> {
        self.parsers
            .iter()
            .copied()
            .find(|parser| parser.command_type() == command.type_name())
    }

    /// Names of the commands usable in the place, in registration order
    pub fn supported_names(&self, place: UsagePlace) -> Vec<String> {
        self.parsers
            .iter()
            .filter(|parser| parser.is_usable_in(place))
            .map(|parser| parser.name().to_string())
            .collect()
    }

    /// Write a command back as a book line
    pub fn stringify(&self, command: &Command) -> Option<String> {
        self.parser_for(command)
            .and_then(|parser| parser.stringify(command))
    }

    /// Parse one command line written in the given place
    pub fn parse(&self, raw: &str, place: UsagePlace) -> Result<Command> {
        let line = CommandLine::tokenize(raw)?;
        let candidates = line.candidates();

        for candidate in &candidates {
            let parsers = self.lookup(&candidate.name, place);
            match parsers.as_slice() {
                [] => continue,
                [parser] => {
                    debug!(
                        "Parsing \"{}\" as {} command in the {}",
                        line.raw(),
                        parser.name(),
                        place
                    );
                    warn_if_deprecated(*parser, line.raw());

                    let input = line.input(candidate.position, place);
                    return parser.parse(input).map_err(|error| ParseError::InvalidCommand {
                        command: parser.name().to_string(),
                        raw: line.raw().to_string(),
                        message: error.to_string(),
                        usage: parser.examples().iter().map(|e| e.to_string()).collect(),
                    });
                }
                _ => {
                    return Err(ParseError::AmbiguousCommand {
                        raw: line.raw().to_string(),
                        place,
                        candidates: parsers.iter().map(|p| p.name().to_string()).collect(),
                        supported: self.supported_names(place),
                    });
                }
            }
        }

        let other_place = match place {
            UsagePlace::PipelineHead => UsagePlace::PipelineTask,
            UsagePlace::PipelineTask => UsagePlace::PipelineHead,
        };
        for candidate in &candidates {
            if let Some(parser) = self.lookup(&candidate.name, other_place).first() {
                return Err(ParseError::CommandNotAllowed {
                    raw: line.raw().to_string(),
                    command: parser.name().to_string(),
                    place,
                    allowed: self.supported_names(place),
                });
            }
        }

        Err(ParseError::UnknownCommand {
            raw: line.raw().to_string(),
            place,
            supported: self.supported_names(place),
        })
    }
}

fn warn_if_deprecated(parser: &dyn CommandParser, raw: &str) {
    let normalized = normalize_to_screaming_case(raw);
    let tokens: Vec<&str> = normalized.split('_').collect();

    if let Some(name) = parser
        .deprecated_names()
        .iter()
        .find(|name| tokens.contains(name) || normalized.starts_with(*name))
    {
        warn!(
            "Command name {} in \"{}\" is deprecated, use {} instead",
            name,
            raw,
            parser.name()
        );
    }
}

/// Parse one command line with the built-in registry
pub fn parse_command(raw: &str, place: UsagePlace) -> Result<Command> {
    CommandRegistry::global().parse(raw, place)
}
