//! Compiled pipeline data model
//!
//! This module contains the JSON shapes a book compiles into:
//! - Pipelines with their head metadata, knowledge and personas
//! - Tasks with their dependencies, expectations and model requirements
//! - Parameters with their resolved role

pub mod parameter;
pub mod pipeline;
pub mod requirements;
pub mod task;

pub use parameter::{ParameterJson, ParameterRole};
pub use pipeline::{
    KnowledgePieceJson, KnowledgeSourceJson, PersonaJson, PipelineJson, PipelineSource,
    PreparationJson,
};
pub use requirements::{ModelRequirements, ModelVariant};
pub use task::{
    ExpectationAmount, ExpectationUnit, Expectations, ForeachJson, FormatName, TaskJson, TaskType,
};
