//! Pipeline tasks

use super::requirements::ModelRequirements;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Kind of work a task performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Prompt sent to a language model
    #[serde(rename = "PROMPT_TASK")]
    Prompt,
    /// Template interpolation without any model call
    #[serde(rename = "SIMPLE_TASK")]
    Simple,
    /// Script executed by a script runner
    #[serde(rename = "SCRIPT_TASK")]
    Script,
    /// Question answered by the user
    #[serde(rename = "DIALOG_TASK")]
    Dialog,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Prompt => "PROMPT_TASK",
            TaskType::Simple => "SIMPLE_TASK",
            TaskType::Script => "SCRIPT_TASK",
            TaskType::Dialog => "DIALOG_TASK",
        }
    }
}

/// Unit an amount expectation is counted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectationUnit {
    Characters,
    Words,
    Sentences,
    Lines,
    Paragraphs,
    Pages,
}

impl ExpectationUnit {
    pub const ALL: [ExpectationUnit; 6] = [
        ExpectationUnit::Characters,
        ExpectationUnit::Words,
        ExpectationUnit::Sentences,
        ExpectationUnit::Lines,
        ExpectationUnit::Paragraphs,
        ExpectationUnit::Pages,
    ];

    /// Plural upper-case form used in commands, e.g. `CHARACTERS`
    pub fn plural(&self) -> &'static str {
        match self {
            ExpectationUnit::Characters => "CHARACTERS",
            ExpectationUnit::Words => "WORDS",
            ExpectationUnit::Sentences => "SENTENCES",
            ExpectationUnit::Lines => "LINES",
            ExpectationUnit::Paragraphs => "PARAGRAPHS",
            ExpectationUnit::Pages => "PAGES",
        }
    }

    /// Singular upper-case form, e.g. `CHARACTER`
    pub fn singular(&self) -> &'static str {
        let plural = self.plural();
        &plural[..plural.len() - 1]
    }
}

/// Bounds of one expectation unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectationAmount {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
}

/// Amount expectations of a task keyed by unit
pub type Expectations = BTreeMap<ExpectationUnit, ExpectationAmount>;

/// Structured format a task result must have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatName {
    Json,
}

impl FormatName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormatName::Json => "JSON",
        }
    }
}

/// Iteration of a task over the items of a structured parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForeachJson {
    /// Format of the iterated parameter, e.g. `CSV`
    pub format_name: String,
    /// Part of the format iterated over, e.g. `ROW`
    pub subformat_name: String,
    /// The iterated parameter
    pub parameter_name: String,
    /// Names the iterated item is split into
    pub input_subparameter_names: Vec<String>,
    /// Name each iteration result is stored under
    pub output_subparameter_name: String,
}

/// A task of a compiled pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskJson {
    /// Kebab-case name derived from the title
    pub name: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub task_type: TaskType,

    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resulting_parameter_name: Option<String>,

    #[serde(default)]
    pub dependent_parameter_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub joker_parameter_names: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub postprocessing_function_names: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub expectations: Expectations,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FormatName>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreach: Option<ForeachJson>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_requirements: Option<ModelRequirements>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prepared_content: Option<String>,
}

impl TaskJson {
    /// Create a task with the given identity and no commands applied
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        task_type: TaskType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: None,
            task_type,
            content: content.into(),
            content_language: None,
            resulting_parameter_name: None,
            dependent_parameter_names: Vec::new(),
            joker_parameter_names: Vec::new(),
            postprocessing_function_names: Vec::new(),
            expectations: Expectations::new(),
            format: None,
            foreach: None,
            persona_name: None,
            model_requirements: None,
            prepared_content: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unit_forms() {
        assert_eq!(ExpectationUnit::Characters.plural(), "CHARACTERS");
        assert_eq!(ExpectationUnit::Pages.singular(), "PAGE");
    }

    #[test]
    fn test_task_omits_absent_fields() {
        let mut task = TaskJson::new("do", "Do", TaskType::Prompt, "Say {x}");
        task.resulting_parameter_name = Some("y".to_string());
        task.dependent_parameter_names = vec!["x".to_string()];
        task.expectations.insert(
            ExpectationUnit::Words,
            ExpectationAmount { min: Some(1), max: None },
        );

        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "do",
                "title": "Do",
                "taskType": "PROMPT_TASK",
                "content": "Say {x}",
                "resultingParameterName": "y",
                "dependentParameterNames": ["x"],
                "expectations": {"words": {"min": 1}}
            })
        );
    }
}
