//! Promptbook SDK
//!
//! High-level API for loading configuration, initializing tracing and
//! compiling sets of books into a [`BookLibrary`].

pub mod builder;
pub mod config;
pub mod error;
pub mod library;
pub mod logging;

// Re-export main types
pub use builder::BookLibraryBuilder;
pub use config::{BookContent, SdkConfig};
pub use error::{Result, SdkError};
pub use library::BookLibrary;
pub use logging::init_tracing;

// Re-export commonly used types from dependencies
pub use promptbook_compiler::{pipeline_to_book, Compiler, CompilerOptions};
pub use promptbook_core::PipelineJson;
