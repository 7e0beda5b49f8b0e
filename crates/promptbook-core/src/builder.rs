//! Mutable builders the compiler assembles pipelines with
//!
//! A [`PipelineBuilder`] owns the in-progress pipeline. Command handlers get
//! `&mut` access to it (and to the [`TaskBuilder`] of the current section)
//! for the duration of a single call. Parameter roles stay undetermined
//! (`None`) until the compiler resolves them, then [`PipelineBuilder::build`]
//! freezes everything into a [`PipelineJson`].

use crate::command::SectionType;
use crate::constants::is_reserved_parameter_name;
use crate::error::{CoreError, Result};
use crate::model::{
    Expectations, ForeachJson, FormatName, KnowledgeSourceJson, ModelRequirements,
    ParameterJson, ParameterRole, PersonaJson, PipelineJson, PipelineSource, TaskJson,
};
use log::warn;
use serde::Serialize;

/// A parameter whose role may still be undetermined
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterBuilder {
    pub name: String,
    pub description: Option<String>,
    /// `None` until declared or resolved
    pub role: Option<ParameterRole>,
    pub example_values: Vec<String>,
}

impl ParameterBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            role: None,
            example_values: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_role(mut self, role: Option<ParameterRole>) -> Self {
        self.role = role;
        self
    }

    /// Freeze the parameter, undetermined roles become intermediate
    pub fn build(self) -> ParameterJson {
        ParameterJson {
            name: self.name,
            description: self.description,
            role: self.role.unwrap_or(ParameterRole::Intermediate),
            example_values: self.example_values,
        }
    }
}

/// Pipeline under construction
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineBuilder {
    pub title: String,
    pub pipeline_url: Option<String>,
    pub book_version: Option<String>,
    pub description: Option<String>,
    pub formfactor_name: Option<String>,
    pub parameters: Vec<ParameterBuilder>,
    pub default_model_requirements: Option<ModelRequirements>,
    pub tasks: Vec<TaskJson>,
    pub knowledge_sources: Vec<KnowledgeSourceJson>,
    pub personas: Vec<PersonaJson>,
    pub sources: Vec<PipelineSource>,
}

impl PipelineBuilder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterBuilder> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn parameter_mut(&mut self, name: &str) -> Option<&mut ParameterBuilder> {
        self.parameters.iter_mut().find(|p| p.name == name)
    }

    /// Declare a parameter or merge the declaration into an existing one
    ///
    /// Re-declaring with the same description (or none) is allowed, a
    /// different description or an input/output conflict is an error.
    pub fn define_parameter(&mut self, definition: ParameterBuilder) -> Result<()> {
        if is_reserved_parameter_name(&definition.name) {
            return Err(CoreError::ReservedParameterName(definition.name));
        }

        let Some(existing) = self.parameter_mut(&definition.name) else {
            self.parameters.push(definition);
            return Ok(());
        };

        match (&existing.description, definition.description) {
            (Some(first), Some(second)) if first != &second => {
                return Err(CoreError::ParameterRedefinition {
                    name: definition.name,
                    first: first.clone(),
                    second,
                });
            }
            (None, Some(second)) => existing.description = Some(second),
            _ => {}
        }

        match (existing.role, definition.role) {
            (Some(first), Some(second)) if first != second => {
                return Err(CoreError::ConflictingParameterRole(definition.name));
            }
            (None, Some(second)) => existing.role = Some(second),
            _ => {}
        }

        existing.example_values.extend(definition.example_values);
        Ok(())
    }

    /// Register a persona, merging descriptions of an already known one
    pub fn register_persona(&mut self, name: &str, description: Option<&str>) {
        let Some(existing) = self.personas.iter_mut().find(|p| p.name == name) else {
            self.personas.push(PersonaJson {
                name: name.to_string(),
                description: description.map(str::to_string),
            });
            return;
        };

        let Some(description) = description else {
            return;
        };

        match &existing.description {
            None => existing.description = Some(description.to_string()),
            Some(current) if current == description => {}
            Some(current) => {
                warn!(
                    "Persona \"{}\" is defined multiple times with different descriptions, merging them",
                    name
                );
                existing.description = Some(format!("{}\n\n{}", current, description));
            }
        }
    }

    pub fn has_task(&self, name: &str) -> bool {
        self.tasks.iter().any(|t| t.name == name)
    }

    /// Check whether some task produces the parameter
    pub fn is_task_result(&self, name: &str) -> bool {
        self.tasks
            .iter()
            .any(|t| t.resulting_parameter_name.as_deref() == Some(name))
    }

    /// Freeze the pipeline
    pub fn build(self) -> PipelineJson {
        let mut pipeline = PipelineJson::new(self.title);
        pipeline.pipeline_url = self.pipeline_url;
        pipeline.book_version = self.book_version;
        pipeline.description = self.description;
        pipeline.formfactor_name = self.formfactor_name;
        pipeline.parameters = self
            .parameters
            .into_iter()
            .map(ParameterBuilder::build)
            .collect();
        pipeline.default_model_requirements = self.default_model_requirements;
        pipeline.tasks = self.tasks;
        pipeline.knowledge_sources = self.knowledge_sources;
        pipeline.personas = self.personas;
        pipeline.sources = self.sources;
        pipeline
    }
}

/// Section under construction
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskBuilder {
    pub name: String,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub content_language: Option<String>,
    pub resulting_parameter_name: Option<String>,
    /// Set once by the `SECTION` command
    pub section_type: Option<SectionType>,
    pub persona_name: Option<String>,
    pub model_requirements: Option<ModelRequirements>,
    pub expectations: Expectations,
    pub format: Option<FormatName>,
    pub joker_parameter_names: Vec<String>,
    pub postprocessing_function_names: Vec<String>,
    pub foreach: Option<ForeachJson>,
}

impl TaskBuilder {
    pub fn new(name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// JSON snapshot used in error messages
    pub fn snapshot(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| format!("{:?}", self))
    }

    /// Freeze into a task, `None` for sections that are not tasks
    ///
    /// Dependent parameters are left empty, they are computed from the
    /// finished task.
    pub fn build(self) -> Option<TaskJson> {
        let task_type = self.section_type?.task_type()?;

        let mut task = TaskJson::new(self.name, self.title, task_type, self.content);
        task.description = self.description;
        task.content_language = self.content_language;
        task.resulting_parameter_name = self.resulting_parameter_name;
        task.joker_parameter_names = self.joker_parameter_names;
        task.postprocessing_function_names = self.postprocessing_function_names;
        task.expectations = self.expectations;
        task.format = self.format;
        task.foreach = self.foreach;
        task.persona_name = self.persona_name;
        task.model_requirements = self.model_requirements.filter(|r| !r.is_empty());
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define_parameter_merges_descriptions() {
        let mut pipeline = PipelineBuilder::new("Test");
        pipeline.define_parameter(ParameterBuilder::new("topic")).unwrap();
        pipeline
            .define_parameter(
                ParameterBuilder::new("topic").with_description(Some("Topic".to_string())),
            )
            .unwrap();
        pipeline
            .define_parameter(
                ParameterBuilder::new("topic").with_description(Some("Topic".to_string())),
            )
            .unwrap();

        assert_eq!(pipeline.parameters.len(), 1);
        assert_eq!(pipeline.parameters[0].description.as_deref(), Some("Topic"));

        let result = pipeline.define_parameter(
            ParameterBuilder::new("topic").with_description(Some("Other".to_string())),
        );
        assert!(matches!(result, Err(CoreError::ParameterRedefinition { .. })));
    }

    #[test]
    fn test_define_parameter_role_conflict() {
        let mut pipeline = PipelineBuilder::new("Test");
        pipeline
            .define_parameter(ParameterBuilder::new("x").with_role(Some(ParameterRole::Input)))
            .unwrap();
        pipeline.define_parameter(ParameterBuilder::new("x")).unwrap();
        assert_eq!(pipeline.parameters[0].role, Some(ParameterRole::Input));

        let result = pipeline
            .define_parameter(ParameterBuilder::new("x").with_role(Some(ParameterRole::Output)));
        assert_eq!(result, Err(CoreError::ConflictingParameterRole("x".to_string())));
    }

    #[test]
    fn test_reserved_parameter_rejected() {
        let mut pipeline = PipelineBuilder::new("Test");
        let result = pipeline.define_parameter(ParameterBuilder::new("knowledge"));
        assert!(matches!(result, Err(CoreError::ReservedParameterName(_))));
    }

    #[test]
    fn test_persona_merge() {
        let mut pipeline = PipelineBuilder::new("Test");
        pipeline.register_persona("Jane", None);
        pipeline.register_persona("Jane", Some("copywriter"));
        pipeline.register_persona("Jane", Some("copywriter"));
        pipeline.register_persona("Jane", Some("poet"));

        assert_eq!(pipeline.personas.len(), 1);
        assert_eq!(
            pipeline.personas[0].description.as_deref(),
            Some("copywriter\n\npoet")
        );
    }

    #[test]
    fn test_task_builder_build() {
        let mut task = TaskBuilder::new("do", "Do");
        task.content = "Say hi".to_string();
        assert!(task.clone().build().is_none());

        task.section_type = Some(SectionType::Example);
        assert!(task.clone().build().is_none());

        task.section_type = Some(SectionType::Simple);
        task.model_requirements = Some(ModelRequirements::default());
        let built = task.build().unwrap();
        assert_eq!(built.task_type, crate::model::TaskType::Simple);
        assert!(built.model_requirements.is_none());
    }

    #[test]
    fn test_undetermined_role_builds_as_intermediate() {
        let mut pipeline = PipelineBuilder::new("Test");
        pipeline.define_parameter(ParameterBuilder::new("x")).unwrap();
        let json = pipeline.build();
        assert_eq!(json.parameters[0].role, ParameterRole::Intermediate);
    }
}
