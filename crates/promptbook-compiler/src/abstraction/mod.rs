//! High-level abstractions
//!
//! Passes over a finished pipeline that fill in what a short book leaves
//! implicit. Each pass checks its own precondition and does nothing when it
//! does not hold, running the passes again never changes the pipeline.

mod implicit_formfactor;
mod quick_chatbot;

pub use implicit_formfactor::ImplicitFormfactor;
pub use quick_chatbot::QuickChatbot;

use log::debug;
use promptbook_core::PipelineJson;

/// A pass enriching a compiled pipeline
pub trait HighLevelAbstraction: Send + Sync {
    fn name(&self) -> &'static str;

    fn apply(&self, pipeline: &mut PipelineJson);
}

/// Every pass, in the order they run
pub static HIGH_LEVEL_ABSTRACTIONS: &[&dyn HighLevelAbstraction] = &[&ImplicitFormfactor, &QuickChatbot];

/// Run every high-level abstraction on the pipeline
pub fn apply_high_level_abstractions(pipeline: &mut PipelineJson) {
    for abstraction in HIGH_LEVEL_ABSTRACTIONS {
        debug!(
            "Applying {} to the pipeline \"{}\"",
            abstraction.name(),
            pipeline.title
        );
        abstraction.apply(pipeline);
    }
}
