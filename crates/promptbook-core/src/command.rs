//! Parsed book commands
//!
//! Every list item of a book is parsed into exactly one [`Command`]. Commands
//! are transient: they are applied to the pipeline being built and can be
//! reconstructed from a compiled pipeline.

use crate::model::{ExpectationUnit, FormatName, ForeachJson, ModelVariant, TaskType};
use serde::{Deserialize, Serialize};

/// A single parsed command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    /// `BOOK VERSION 1.0.0`
    BookVersion { book_version: String },

    /// `URL https://...`
    Url { pipeline_url: String },

    /// `PARAMETER {name} description`
    Parameter(ParameterCommand),

    /// `PERSONA Name, description`
    Persona {
        persona_name: String,
        persona_description: Option<String>,
    },

    /// `KNOWLEDGE <url | path | text>`
    Knowledge { knowledge_source_content: String },

    /// `FORMFACTOR Chatbot`
    Formfactor { formfactor_name: String },

    /// `PROMPT SECTION`, `SCRIPT SECTION`, ...
    Section { section_type: SectionType },

    /// `MODEL NAME gpt-4`
    Model { requirement: ModelRequirement },

    /// `EXPECT MAX 5 CHARACTERS`
    ExpectAmount {
        sign: ExpectSign,
        unit: ExpectationUnit,
        amount: u32,
    },

    /// `FORMAT JSON`
    ExpectFormat { format: FormatName },

    /// `JOKER {name}`
    Joker { parameter_name: String },

    /// `POSTPROCESS functionName`
    Postprocess { function_name: String },

    /// `FOREACH Csv Row {rows} -> {a}, +{b}`
    Foreach(ForeachJson),

    /// `ACTION`
    Action,

    /// `INSTRUMENT`
    Instrument,
}

impl Command {
    /// The `type` tag of the command
    pub fn type_name(&self) -> &'static str {
        match self {
            Command::BookVersion { .. } => "BOOK_VERSION",
            Command::Url { .. } => "URL",
            Command::Parameter(_) => "PARAMETER",
            Command::Persona { .. } => "PERSONA",
            Command::Knowledge { .. } => "KNOWLEDGE",
            Command::Formfactor { .. } => "FORMFACTOR",
            Command::Section { .. } => "SECTION",
            Command::Model { .. } => "MODEL",
            Command::ExpectAmount { .. } => "EXPECT_AMOUNT",
            Command::ExpectFormat { .. } => "EXPECT_FORMAT",
            Command::Joker { .. } => "JOKER",
            Command::Postprocess { .. } => "POSTPROCESS",
            Command::Foreach(_) => "FOREACH",
            Command::Action => "ACTION",
            Command::Instrument => "INSTRUMENT",
        }
    }
}

/// Payload of the `PARAMETER` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterCommand {
    pub parameter_name: String,
    pub parameter_description: Option<String>,
    pub is_input: bool,
    pub is_output: bool,
}

/// Payload of the `MODEL` command, one requirement per command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelRequirement {
    Variant(ModelVariant),
    Name(String),
    Temperature(f64),
    MaxTokens(u32),
    Seed(u64),
}

impl ModelRequirement {
    /// Key of the requirement as written in books, e.g. `MAX_TOKENS`
    pub fn key(&self) -> &'static str {
        match self {
            ModelRequirement::Variant(_) => "VARIANT",
            ModelRequirement::Name(_) => "NAME",
            ModelRequirement::Temperature(_) => "TEMPERATURE",
            ModelRequirement::MaxTokens(_) => "MAX_TOKENS",
            ModelRequirement::Seed(_) => "SEED",
        }
    }
}

/// Comparison of an amount expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpectSign {
    Exactly,
    Minimum,
    Maximum,
}

impl ExpectSign {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpectSign::Exactly => "EXACTLY",
            ExpectSign::Minimum => "MINIMUM",
            ExpectSign::Maximum => "MAXIMUM",
        }
    }
}

/// Type of a book section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SectionType {
    Prompt,
    Simple,
    Script,
    Dialog,
    Example,
    Knowledge,
    Instrument,
    Action,
}

impl SectionType {
    pub const ALL: [SectionType; 8] = [
        SectionType::Prompt,
        SectionType::Simple,
        SectionType::Script,
        SectionType::Dialog,
        SectionType::Example,
        SectionType::Knowledge,
        SectionType::Instrument,
        SectionType::Action,
    ];

    /// Word identifying the section type in a normalized command line
    pub fn keyword(&self) -> &'static str {
        match self {
            SectionType::Prompt => "PROMPT",
            SectionType::Simple => "SIMPLE",
            SectionType::Script => "SCRIPT",
            SectionType::Dialog => "DIALOG",
            SectionType::Example => "SAMPLE",
            SectionType::Knowledge => "KNOWLEDGE",
            SectionType::Instrument => "INSTRUMENT",
            SectionType::Action => "ACTION",
        }
    }

    /// Task type the section compiles into, `None` for sections consumed
    /// during compilation
    pub fn task_type(&self) -> Option<TaskType> {
        match self {
            SectionType::Prompt => Some(TaskType::Prompt),
            SectionType::Simple => Some(TaskType::Simple),
            SectionType::Script => Some(TaskType::Script),
            SectionType::Dialog => Some(TaskType::Dialog),
            SectionType::Example
            | SectionType::Knowledge
            | SectionType::Instrument
            | SectionType::Action => None,
        }
    }

    pub fn from_task_type(task_type: TaskType) -> Self {
        match task_type {
            TaskType::Prompt => SectionType::Prompt,
            TaskType::Simple => SectionType::Simple,
            TaskType::Script => SectionType::Script,
            TaskType::Dialog => SectionType::Dialog,
        }
    }
}

/// A format `FOREACH` can iterate over with its subformats
#[derive(Debug, Clone, Copy)]
pub struct ForeachFormatDefinition {
    pub name: &'static str,
    pub subformat_names: &'static [&'static str],
}

pub const FOREACH_FORMATS: &[ForeachFormatDefinition] = &[
    ForeachFormatDefinition {
        name: "TEXT",
        subformat_names: &["LINE"],
    },
    ForeachFormatDefinition {
        name: "CSV",
        subformat_names: &["ROW", "CELL"],
    },
    ForeachFormatDefinition {
        name: "JSON",
        subformat_names: &[],
    },
    ForeachFormatDefinition {
        name: "XML",
        subformat_names: &[],
    },
];

pub fn find_foreach_format(name: &str) -> Option<&'static ForeachFormatDefinition> {
    FOREACH_FORMATS.iter().find(|format| format.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_is_tagged_by_type() {
        let command = Command::ExpectAmount {
            sign: ExpectSign::Maximum,
            unit: ExpectationUnit::Characters,
            amount: 5,
        };
        let value = serde_json::to_value(&command).unwrap();

        assert_eq!(
            value,
            json!({"type": "EXPECT_AMOUNT", "sign": "MAXIMUM", "unit": "characters", "amount": 5})
        );
        assert_eq!(command.type_name(), "EXPECT_AMOUNT");
    }

    #[test]
    fn test_section_types() {
        assert_eq!(SectionType::Example.keyword(), "SAMPLE");
        assert_eq!(SectionType::Script.task_type(), Some(TaskType::Script));
        assert_eq!(SectionType::Knowledge.task_type(), None);
        assert_eq!(SectionType::from_task_type(TaskType::Dialog), SectionType::Dialog);
    }

    #[test]
    fn test_foreach_formats() {
        let csv = find_foreach_format("CSV").unwrap();
        assert!(csv.subformat_names.contains(&"CELL"));
        assert!(find_foreach_format("YAML").is_none());
    }
}
