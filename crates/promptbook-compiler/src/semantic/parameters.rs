//! Parameter dependency extraction

use super::script::{extract_script_variables, ScriptLimits};
use crate::error::{CompileError, Result};
use promptbook_core::constants::is_reserved_parameter_name;
use promptbook_core::{TaskJson, TaskType};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PARAMETER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid regex"));

/// Names written as `{name}` in the text
///
/// JSON braces around a placeholder (`{"a": {name}}`, `{{name}}`) do not
/// hide it.
pub fn extract_parameter_names(text: &str) -> BTreeSet<String> {
    PARAMETER_PATTERN
        .captures_iter(text)
        .filter_map(|captures| captures.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}

/// Parameters a task needs before it can run
pub fn extract_parameter_names_from_task(
    task: &TaskJson,
    limits: &ScriptLimits,
) -> Result<BTreeSet<String>> {
    let mut names = extract_parameter_names(&task.title);

    if let Some(description) = &task.description {
        names.extend(extract_parameter_names(description));
    }

    if task.task_type == TaskType::Script {
        let language = task.content_language.as_deref().ok_or_else(|| {
            CompileError::ScriptAnalysis(format!(
                "Script of the task \"{}\" has no language",
                task.title
            ))
        })?;
        names.extend(extract_script_variables(&task.content, language, limits)?);
    } else {
        names.extend(extract_parameter_names(&task.content));
    }

    if let Some(prepared_content) = &task.prepared_content {
        names.extend(extract_parameter_names(prepared_content));
    }

    names.extend(task.joker_parameter_names.iter().cloned());

    if let Some(foreach) = &task.foreach {
        for subparameter in &foreach.input_subparameter_names {
            names.remove(subparameter);
        }
        names.insert(foreach.parameter_name.clone());
    }

    names.retain(|name| !is_reserved_parameter_name(name));
    Ok(names)
}
