//! Promptbook Core - Core types and definitions for the book compiler
//!
//! This crate provides the fundamental types used across the Promptbook crates:
//! - The compiled pipeline model (`PipelineJson`, `TaskJson`, `ParameterJson`)
//! - The parsed `Command` union
//! - Builders the compiler assembles pipelines with
//! - Formfactor definitions, constants and name normalization
//! - Error types

pub mod builder;
pub mod command;
pub mod constants;
pub mod error;
pub mod formfactor;
pub mod model;
pub mod naming;

// Re-export commonly used types
pub use builder::{ParameterBuilder, PipelineBuilder, TaskBuilder};
pub use command::{Command, ExpectSign, ModelRequirement, ParameterCommand, SectionType};
pub use error::CoreError;
pub use model::{
    ExpectationAmount, ExpectationUnit, Expectations, ForeachJson, FormatName, ModelRequirements,
    ModelVariant, ParameterJson, ParameterRole, PipelineJson, TaskJson, TaskType,
};
