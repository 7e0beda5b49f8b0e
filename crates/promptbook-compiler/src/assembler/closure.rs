//! Parameter role resolution
//!
//! Roles declared with `INPUT PARAMETER` / `OUTPUT PARAMETER` are kept. The
//! rest is resolved in two steps:
//! 1. Without any declared input, every parameter no task produces is an input.
//! 2. Without any declared output, every parameter that is not an input is an output.
//!
//! Whatever is still undetermined afterwards is intermediate.

use log::debug;
use promptbook_core::{ParameterRole, PipelineBuilder};

/// Resolve every undetermined parameter role of the pipeline
pub fn resolve_parameter_roles(pipeline: &mut PipelineBuilder) {
    let has_declared_input = pipeline
        .parameters
        .iter()
        .any(|p| p.role == Some(ParameterRole::Input));

    if !has_declared_input {
        let implicit_inputs: Vec<String> = pipeline
            .parameters
            .iter()
            .filter(|p| p.role.is_none() && !pipeline.is_task_result(&p.name))
            .map(|p| p.name.clone())
            .collect();

        for name in implicit_inputs {
            if let Some(parameter) = pipeline.parameter_mut(&name) {
                debug!("Parameter {{{}}} is an implicit input", name);
                parameter.role = Some(ParameterRole::Input);
            }
        }
    }

    let has_declared_output = pipeline
        .parameters
        .iter()
        .any(|p| p.role == Some(ParameterRole::Output));

    for parameter in &mut pipeline.parameters {
        if parameter.role.is_none() {
            parameter.role = Some(if has_declared_output {
                ParameterRole::Intermediate
            } else {
                ParameterRole::Output
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_core::{ParameterBuilder, TaskJson, TaskType};

    fn builder(parameters: &[(&str, Option<ParameterRole>)], results: &[&str]) -> PipelineBuilder {
        let mut pipeline = PipelineBuilder::new("Test");
        for (name, role) in parameters {
            pipeline
                .define_parameter(ParameterBuilder::new(*name).with_role(*role))
                .unwrap();
        }
        for result in results {
            let mut task = TaskJson::new(*result, *result, TaskType::Prompt, "");
            task.resulting_parameter_name = Some(result.to_string());
            pipeline.tasks.push(task);
        }
        pipeline
    }

    fn roles(pipeline: &PipelineBuilder) -> Vec<Option<ParameterRole>> {
        pipeline.parameters.iter().map(|p| p.role).collect()
    }

    #[test]
    fn test_implicit_inputs_and_outputs() {
        let mut pipeline = builder(&[("x", None), ("y", None)], &["y"]);
        resolve_parameter_roles(&mut pipeline);
        assert_eq!(
            roles(&pipeline),
            vec![Some(ParameterRole::Input), Some(ParameterRole::Output)]
        );
    }

    #[test]
    fn test_declared_roles_keep_the_rest_intermediate() {
        let mut pipeline = builder(
            &[
                ("x", Some(ParameterRole::Input)),
                ("draft", None),
                ("y", Some(ParameterRole::Output)),
                ("unused", None),
            ],
            &["draft", "y"],
        );
        resolve_parameter_roles(&mut pipeline);
        assert_eq!(
            roles(&pipeline),
            vec![
                Some(ParameterRole::Input),
                Some(ParameterRole::Intermediate),
                Some(ParameterRole::Output),
                Some(ParameterRole::Intermediate),
            ]
        );
    }

    #[test]
    fn test_declared_input_only() {
        let mut pipeline = builder(&[("x", Some(ParameterRole::Input)), ("y", None)], &["y"]);
        resolve_parameter_roles(&mut pipeline);
        assert_eq!(pipeline.parameters[1].role, Some(ParameterRole::Output));
    }
}
