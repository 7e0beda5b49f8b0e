//! Compiled pipeline

use super::parameter::{ParameterJson, ParameterRole};
use super::requirements::ModelRequirements;
use super::task::TaskJson;
use crate::constants::DEFAULT_FORMFACTOR_NAME;
use serde::{Deserialize, Serialize};

/// The result of compiling a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineJson {
    pub title: String,

    /// Canonical `https://` URL identifying the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_url: Option<String>,

    /// Semver of the book language the pipeline was written in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Interface shape of the pipeline, always set once compilation finishes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formfactor_name: Option<String>,

    #[serde(default)]
    pub parameters: Vec<ParameterJson>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model_requirements: Option<ModelRequirements>,

    #[serde(default)]
    pub tasks: Vec<TaskJson>,

    #[serde(default)]
    pub knowledge_sources: Vec<KnowledgeSourceJson>,

    #[serde(default)]
    pub knowledge_pieces: Vec<KnowledgePieceJson>,

    #[serde(default)]
    pub personas: Vec<PersonaJson>,

    #[serde(default)]
    pub preparations: Vec<PreparationJson>,

    /// Raw text the pipeline was compiled from
    #[serde(default)]
    pub sources: Vec<PipelineSource>,
}

impl PipelineJson {
    /// Create an empty pipeline with the given title
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            pipeline_url: None,
            book_version: None,
            description: None,
            formfactor_name: None,
            parameters: Vec::new(),
            default_model_requirements: None,
            tasks: Vec::new(),
            knowledge_sources: Vec::new(),
            knowledge_pieces: Vec::new(),
            personas: Vec::new(),
            preparations: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Formfactor name, falling back to the generic formfactor
    pub fn formfactor(&self) -> &str {
        self.formfactor_name
            .as_deref()
            .unwrap_or(DEFAULT_FORMFACTOR_NAME)
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterJson> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn task(&self, name: &str) -> Option<&TaskJson> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Names of the parameters with the given role, in declaration order
    pub fn parameter_names_with_role(&self, role: ParameterRole) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.role == role)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// A persona a prompt is written from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaJson {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A source of knowledge declared in the head
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSourceJson {
    pub name: String,
    /// URL, file path or inline text
    pub knowledge_source_content: String,
}

/// A prepared piece of knowledge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgePieceJson {
    pub name: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Names of the knowledge sources the piece comes from
    #[serde(default)]
    pub sources: Vec<String>,
}

/// A preparation run recorded on the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparationJson {
    pub id: String,
    pub book_version: String,
}

/// Raw text a pipeline was compiled from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSource {
    /// Always `BOOK`
    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pipeline_serialization() {
        let pipeline = PipelineJson::new("Empty");
        let value = serde_json::to_value(&pipeline).unwrap();

        assert_eq!(value["title"], "Empty");
        assert!(value.get("pipelineUrl").is_none());
        assert_eq!(value["parameters"], serde_json::json!([]));
        assert_eq!(pipeline.formfactor(), "GENERIC");
    }

    #[test]
    fn test_pipeline_round_trips_through_json() {
        let mut pipeline = PipelineJson::new("Echo");
        pipeline.formfactor_name = Some("COMPLETION".to_string());
        pipeline
            .parameters
            .push(ParameterJson::new("inputText", ParameterRole::Input));
        pipeline.sources.push(PipelineSource {
            source_type: "BOOK".to_string(),
            path: None,
            content: "# Echo".to_string(),
        });

        let json = serde_json::to_string(&pipeline).unwrap();
        let parsed: PipelineJson = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, pipeline);
        assert_eq!(parsed.parameter_names_with_role(ParameterRole::Input), vec!["inputText"]);
    }
}
