//! Formfactor inference from the parameter interface

use super::HighLevelAbstraction;
use log::debug;
use promptbook_core::formfactor::FORMFACTOR_DEFINITIONS;
use promptbook_core::{ParameterRole, PipelineJson};
use std::collections::BTreeSet;

/// Sets the formfactor whose interface matches the input and output parameters
pub struct ImplicitFormfactor;

impl HighLevelAbstraction for ImplicitFormfactor {
    fn name(&self) -> &'static str {
        "implicit formfactor"
    }

    fn apply(&self, pipeline: &mut PipelineJson) {
        if pipeline.formfactor_name.is_some() {
            return;
        }

        let inputs: BTreeSet<&str> = pipeline
            .parameter_names_with_role(ParameterRole::Input)
            .into_iter()
            .collect();
        let outputs: BTreeSet<&str> = pipeline
            .parameter_names_with_role(ParameterRole::Output)
            .into_iter()
            .collect();

        let matching = FORMFACTOR_DEFINITIONS
            .iter()
            .filter(|formfactor| !formfactor.has_empty_interface())
            .find(|formfactor| {
                formfactor.input_names().collect::<BTreeSet<_>>() == inputs
                    && formfactor.output_names().collect::<BTreeSet<_>>() == outputs
            });

        if let Some(formfactor) = matching {
            debug!(
                "Pipeline \"{}\" matches the {} formfactor",
                pipeline.title, formfactor.name
            );
            pipeline.formfactor_name = Some(formfactor.name.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_core::ParameterJson;

    #[test]
    fn test_infers_translator() {
        let mut pipeline = PipelineJson::new("Translate");
        pipeline
            .parameters
            .push(ParameterJson::new("inputMessage", ParameterRole::Input));
        pipeline
            .parameters
            .push(ParameterJson::new("outputMessage", ParameterRole::Output));

        ImplicitFormfactor.apply(&mut pipeline);
        assert_eq!(pipeline.formfactor_name.as_deref(), Some("TRANSLATOR"));
    }

    #[test]
    fn test_keeps_explicit_formfactor() {
        let mut pipeline = PipelineJson::new("Translate");
        pipeline.formfactor_name = Some("GENERATOR".to_string());
        pipeline
            .parameters
            .push(ParameterJson::new("inputText", ParameterRole::Input));
        pipeline
            .parameters
            .push(ParameterJson::new("outputText", ParameterRole::Output));

        ImplicitFormfactor.apply(&mut pipeline);
        assert_eq!(pipeline.formfactor_name.as_deref(), Some("GENERATOR"));
    }

    #[test]
    fn test_no_match_leaves_formfactor_unset() {
        let mut pipeline = PipelineJson::new("Empty");
        ImplicitFormfactor.apply(&mut pipeline);
        assert_eq!(pipeline.formfactor_name, None);
    }
}
