//! Logic validation of compiled pipelines
//!
//! Checks that a finished pipeline is internally consistent and that every
//! task can eventually run starting from the input parameters.

use crate::error::{CompileError, Result};
use log::debug;
use promptbook_core::constants::is_reserved_parameter_name;
use promptbook_core::{ParameterRole, PipelineJson};
use std::collections::{HashMap, HashSet};

/// Validate the logic of a compiled pipeline
pub fn validate_pipeline(pipeline: &PipelineJson) -> Result<()> {
    check_unique_names(pipeline)?;
    check_declared_parameters(pipeline)?;
    check_producers(pipeline)?;
    check_expectations(pipeline)?;
    check_resolvable(pipeline)?;

    debug!("Pipeline \"{}\" passed logic validation", pipeline.title);
    Ok(())
}

fn check_unique_names(pipeline: &PipelineJson) -> Result<()> {
    let mut seen = HashSet::new();
    for parameter in &pipeline.parameters {
        if !seen.insert(parameter.name.as_str()) {
            return Err(CompileError::Validation(format!(
                "Parameter {{{}}} is defined multiple times",
                parameter.name
            )));
        }
    }

    let mut seen = HashSet::new();
    for task in &pipeline.tasks {
        if !seen.insert(task.name.as_str()) {
            return Err(CompileError::Validation(format!(
                "Task name \"{}\" is used by multiple tasks",
                task.name
            )));
        }
    }

    Ok(())
}

fn check_declared_parameters(pipeline: &PipelineJson) -> Result<()> {
    for task in &pipeline.tasks {
        let used = task
            .dependent_parameter_names
            .iter()
            .chain(task.resulting_parameter_name.iter());

        for name in used {
            if pipeline.parameter(name).is_none() {
                return Err(CompileError::Validation(format!(
                    "Parameter {{{}}} is used in the task \"{}\" but not defined in the pipeline",
                    name, task.title
                )));
            }
        }
    }

    Ok(())
}

fn check_producers(pipeline: &PipelineJson) -> Result<()> {
    let mut producers: HashMap<&str, &str> = HashMap::new();

    for task in &pipeline.tasks {
        let Some(result) = task.resulting_parameter_name.as_deref() else {
            continue;
        };

        if let Some(first) = producers.insert(result, task.title.as_str()) {
            return Err(CompileError::Validation(format!(
                "Parameter {{{}}} is produced by both tasks \"{}\" and \"{}\"",
                result, first, task.title
            )));
        }

        if pipeline
            .parameter(result)
            .is_some_and(|p| p.role == ParameterRole::Input)
        {
            return Err(CompileError::Validation(format!(
                "Parameter {{{}}} is an input parameter, it can not be the result of the task \"{}\"",
                result, task.title
            )));
        }
    }

    Ok(())
}

fn check_expectations(pipeline: &PipelineJson) -> Result<()> {
    for task in &pipeline.tasks {
        if !task.joker_parameter_names.is_empty()
            && task.expectations.is_empty()
            && task.format.is_none()
        {
            return Err(CompileError::Validation(format!(
                "Joker parameters are used in the task \"{}\" but it has no expectations or format to check them against",
                task.title
            )));
        }

        for (unit, amount) in &task.expectations {
            if let (Some(min), Some(max)) = (amount.min, amount.max) {
                if min > max {
                    return Err(CompileError::Validation(format!(
                        "Minimum {} ({}) is greater than maximum ({}) in the task \"{}\"",
                        unit.plural(),
                        min,
                        max,
                        task.title
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Resolve tasks in rounds starting from the inputs until nothing changes
fn check_resolvable(pipeline: &PipelineJson) -> Result<()> {
    let mut resolved: HashSet<&str> = pipeline
        .parameter_names_with_role(ParameterRole::Input)
        .into_iter()
        .collect();
    let mut pending: Vec<_> = pipeline.tasks.iter().collect();

    while !pending.is_empty() {
        let (ready, blocked): (Vec<_>, Vec<_>) = pending.into_iter().partition(|task| {
            task.dependent_parameter_names
                .iter()
                .all(|name| resolved.contains(name.as_str()) || is_reserved_parameter_name(name))
        });

        if ready.is_empty() {
            let details = blocked
                .iter()
                .map(|task| {
                    let missing: Vec<String> = task
                        .dependent_parameter_names
                        .iter()
                        .filter(|name| !resolved.contains(name.as_str()))
                        .map(|name| format!("{{{}}}", name))
                        .collect();
                    format!("- \"{}\" waits for {}", task.title, missing.join(", "))
                })
                .collect::<Vec<_>>()
                .join("\n");

            return Err(CompileError::Validation(format!(
                "Can not resolve some tasks, there is a circular or missing dependency:\n\n{}",
                details
            )));
        }

        for task in ready {
            if let Some(result) = task.resulting_parameter_name.as_deref() {
                resolved.insert(result);
            }
        }
        pending = blocked;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_core::{ExpectationAmount, ExpectationUnit, ParameterJson, TaskJson, TaskType};

    fn pipeline(tasks: Vec<(&str, Vec<&str>, &str)>, inputs: &[&str]) -> PipelineJson {
        let mut pipeline = PipelineJson::new("Test");
        for input in inputs {
            pipeline.parameters.push(ParameterJson::new(*input, ParameterRole::Input));
        }
        for (name, dependencies, result) in tasks {
            let mut task = TaskJson::new(name, name, TaskType::Prompt, "");
            task.dependent_parameter_names = dependencies.iter().map(|d| d.to_string()).collect();
            task.resulting_parameter_name = Some(result.to_string());
            pipeline.tasks.push(task);
            if pipeline.parameter(result).is_none() {
                pipeline.parameters.push(ParameterJson::new(result, ParameterRole::Output));
            }
        }
        pipeline
    }

    #[test]
    fn test_valid_chain() {
        let pipeline = pipeline(
            vec![("second", vec!["a"], "b"), ("first", vec!["x"], "a")],
            &["x"],
        );
        assert!(validate_pipeline(&pipeline).is_ok());
    }

    #[test]
    fn test_circular_dependency() {
        let pipeline = pipeline(vec![("one", vec!["b"], "a"), ("two", vec!["a"], "b")], &[]);
        let error = validate_pipeline(&pipeline).unwrap_err();
        assert!(error.to_string().contains("circular"), "{}", error);
    }

    #[test]
    fn test_undeclared_dependency() {
        let pipeline = pipeline(vec![("one", vec!["ghost"], "a")], &[]);
        let error = validate_pipeline(&pipeline).unwrap_err();
        assert!(error.to_string().contains("{ghost}"), "{}", error);
    }

    #[test]
    fn test_result_produced_twice() {
        let pipeline = pipeline(vec![("one", vec!["x"], "a"), ("two", vec!["x"], "a")], &["x"]);
        assert!(matches!(
            validate_pipeline(&pipeline),
            Err(CompileError::Validation(_))
        ));
    }

    #[test]
    fn test_input_can_not_be_a_result() {
        let pipeline = pipeline(vec![("one", vec![], "x")], &["x"]);
        let error = validate_pipeline(&pipeline).unwrap_err();
        assert!(error.to_string().contains("input parameter"), "{}", error);
    }

    #[test]
    fn test_joker_requires_expectations() {
        let mut pipeline = pipeline(vec![("one", vec!["x"], "a")], &["x"]);
        pipeline.tasks[0].joker_parameter_names = vec!["x".to_string()];
        assert!(validate_pipeline(&pipeline).is_err());

        pipeline.tasks[0].expectations.insert(
            ExpectationUnit::Words,
            ExpectationAmount {
                min: Some(1),
                max: Some(5),
            },
        );
        assert!(validate_pipeline(&pipeline).is_ok());
    }
}
