//! Command line tokenizer and normalizer

use super::UsagePlace;
use crate::error::{ParseError, Result};
use promptbook_core::naming::normalize_to_screaming_case;
use std::collections::VecDeque;

/// Longest command name, in words
const MAX_NAME_WORDS: usize = 3;

/// Fold synonyms and deprecated words into their canonical token
fn canonical_token(token: &str) -> &str {
    match token {
        "EXAMPLE" => "SAMPLE",
        "DIALOGUE" => "DIALOG",
        "EXECUTE" | "BLOCK" | "TEMPLATE" => "SECTION",
        other => other,
    }
}

/// Normalize command text to SCREAMING_SNAKE_CASE with synonyms collapsed
///
/// `"**Example** section"` becomes `"SAMPLE_SECTION"`.
pub fn normalize_command_text(text: &str) -> String {
    normalize_to_screaming_case(text)
        .split('_')
        .filter(|token| !token.is_empty())
        .map(canonical_token)
        .collect::<Vec<_>>()
        .join("_")
}

/// Strip emphasis, code span and quoting markers around an argument
fn argument_form(word: &str) -> &str {
    word.trim_matches(|c| matches!(c, '`' | '"' | '\'' | '*'))
}

/// Input handed to a command parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInput {
    pub usage_place: UsagePlace,
    /// The whole line as written
    pub raw: String,
    /// The whole line normalized with [`normalize_command_text`]
    pub normalized: String,
    /// Words after the command name with markers stripped
    pub args: VecDeque<String>,
    /// Text after the command name with its original spacing
    pub raw_args: String,
}

/// Where the command name was found on the line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePosition {
    /// The first `n` words
    Leading(usize),
    /// The last word
    Trailing,
}

/// A possible command name of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCandidate {
    pub name: String,
    pub position: NamePosition,
}

#[derive(Debug, Clone, Copy)]
struct Word<'a> {
    text: &'a str,
    start: usize,
}

/// A single command line split into words
#[derive(Debug, Clone)]
pub struct CommandLine<'a> {
    raw: &'a str,
    words: Vec<Word<'a>>,
}

impl<'a> CommandLine<'a> {
    pub fn tokenize(raw: &'a str) -> Result<Self> {
        let raw = raw.trim();
        if raw.contains('\n') || raw.contains('\r') {
            return Err(ParseError::MultilineCommand(raw.to_string()));
        }

        let mut words = Vec::new();
        let mut start = None;
        for (index, c) in raw.char_indices() {
            match (c.is_whitespace(), start) {
                (true, Some(word_start)) => {
                    words.push(Word {
                        text: &raw[word_start..index],
                        start: word_start,
                    });
                    start = None;
                }
                (false, None) => start = Some(index),
                _ => {}
            }
        }
        if let Some(word_start) = start {
            words.push(Word {
                text: &raw[word_start..],
                start: word_start,
            });
        }

        Ok(Self { raw, words })
    }

    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn normalized(&self) -> String {
        normalize_command_text(self.raw)
    }

    /// Possible command names, longest leading names first, then the trailing word
    pub fn candidates(&self) -> Vec<NameCandidate> {
        let mut candidates = Vec::new();

        for count in (1..=MAX_NAME_WORDS.min(self.words.len())).rev() {
            let text = self.words[..count]
                .iter()
                .map(|word| word.text)
                .collect::<Vec<_>>()
                .join(" ");
            let name = normalize_command_text(&text);
            if !name.is_empty() {
                candidates.push(NameCandidate {
                    name,
                    position: NamePosition::Leading(count),
                });
            }
        }

        if self.words.len() > 1 {
            if let Some(last) = self.words.last() {
                let name = normalize_command_text(last.text);
                if !name.is_empty() {
                    candidates.push(NameCandidate {
                        name,
                        position: NamePosition::Trailing,
                    });
                }
            }
        }

        candidates
    }

    /// Build the parser input for a matched name
    pub fn input(&self, position: NamePosition, usage_place: UsagePlace) -> CommandInput {
        let (arg_words, raw_args) = match position {
            NamePosition::Leading(count) => {
                let raw_args = self
                    .words
                    .get(count)
                    .map(|word| self.raw[word.start..].trim())
                    .unwrap_or("");
                (&self.words[count.min(self.words.len())..], raw_args)
            }
            NamePosition::Trailing => {
                let last = self.words.len().saturating_sub(1);
                let raw_args = self
                    .words
                    .last()
                    .map(|word| self.raw[..word.start].trim())
                    .unwrap_or("");
                (&self.words[..last], raw_args)
            }
        };

        CommandInput {
            usage_place,
            raw: self.raw.to_string(),
            normalized: self.normalized(),
            args: arg_words
                .iter()
                .map(|word| argument_form(word.text))
                .filter(|arg| !arg.is_empty())
                .map(str::to_string)
                .collect(),
            raw_args: raw_args.to_string(),
        }
    }
}
