//! Book reconstruction
//!
//! Writes a compiled pipeline back as a book. Every command is regenerated
//! by the parser that owns it, so compiling the written book yields the
//! same parameters and tasks.

use promptbook_core::{Command, ParameterJson, PipelineJson, TaskJson, TaskType};
use promptbook_parser::{CommandParser, CommandRegistry, UsagePlace};

/// Write a compiled pipeline as a book
pub fn pipeline_to_book(pipeline: &PipelineJson) -> String {
    let registry = CommandRegistry::global();
    let mut blocks = vec![format!("# {}", pipeline.title)];

    if let Some(description) = &pipeline.description {
        blocks.push(description.clone());
    }

    let mut knowledge_sections = Vec::new();
    let mut head_lines = Vec::new();
    for parser in parsers_usable_in(registry, UsagePlace::PipelineHead) {
        for command in parser.take_from_pipeline(pipeline) {
            match &command {
                Command::Knowledge {
                    knowledge_source_content,
                } if knowledge_source_content.contains('\n') => {
                    knowledge_sections.push(knowledge_source_content.clone());
                }
                _ => head_lines.extend(parser.stringify(&command)),
            }
        }
    }
    push_list(&mut blocks, &head_lines);

    for task in &pipeline.tasks {
        push_task(&mut blocks, registry, task);
    }

    for content in &knowledge_sections {
        blocks.push("## Knowledge".to_string());
        blocks.push("- KNOWLEDGE SECTION".to_string());
        blocks.push(fenced(content, None));
    }

    for parameter in &pipeline.parameters {
        push_examples(&mut blocks, parameter);
    }

    let mut book = blocks.join("\n\n");
    book.push('\n');
    book
}

fn parsers_usable_in(
    registry: &'static CommandRegistry,
    place: UsagePlace,
) -> impl Iterator<Item = &'static dyn CommandParser> {
    registry
        .parsers()
        .iter()
        .copied()
        .filter(move |parser| parser.is_usable_in(place))
}

fn push_task(blocks: &mut Vec<String>, registry: &'static CommandRegistry, task: &TaskJson) {
    blocks.push(format!("## {}", task.title));

    let lines: Vec<String> = parsers_usable_in(registry, UsagePlace::PipelineTask)
        .flat_map(|parser| {
            parser
                .take_from_task(task)
                .into_iter()
                .filter_map(move |command| parser.stringify(&command))
        })
        .collect();
    push_list(blocks, &lines);

    if let Some(description) = &task.description {
        blocks.push(description.clone());
    }

    let language = match task.task_type {
        TaskType::Script => task.content_language.as_deref(),
        _ => None,
    };
    blocks.push(fenced(&task.content, language));

    if let Some(result) = &task.resulting_parameter_name {
        blocks.push(format!("-> {{{}}}", result));
    }
}

fn push_examples(blocks: &mut Vec<String>, parameter: &ParameterJson) {
    for value in &parameter.example_values {
        blocks.push("## Example".to_string());
        blocks.push("- EXAMPLE SECTION".to_string());
        blocks.push(fenced(value, None));
        blocks.push(format!("-> {{{}}}", parameter.name));
    }
}

fn push_list(blocks: &mut Vec<String>, lines: &[String]) {
    if !lines.is_empty() {
        blocks.push(
            lines
                .iter()
                .map(|line| format!("- {}", line))
                .collect::<Vec<_>>()
                .join("\n"),
        );
    }
}

fn fenced(content: &str, language: Option<&str>) -> String {
    format!("```{}\n{}\n```", language.unwrap_or_default(), content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_core::{ParameterRole, TaskType};

    #[test]
    fn test_writes_head_and_tasks() {
        let mut pipeline = PipelineJson::new("Greeting");
        pipeline.pipeline_url = Some("https://example.com/greeting.book".to_string());
        pipeline
            .parameters
            .push(ParameterJson::new("name", ParameterRole::Input).with_description("Name"));
        pipeline
            .parameters
            .push(ParameterJson::new("greeting", ParameterRole::Output));

        let mut task = TaskJson::new("greet", "Greet", TaskType::Simple, "Hello {name}");
        task.resulting_parameter_name = Some("greeting".to_string());
        task.dependent_parameter_names = vec!["name".to_string()];
        pipeline.tasks.push(task);

        let book = pipeline_to_book(&pipeline);

        assert!(book.starts_with("# Greeting\n\n"), "{}", book);
        assert!(book.contains("- URL https://example.com/greeting.book"), "{}", book);
        assert!(book.contains("- INPUT PARAMETER {name} Name"), "{}", book);
        assert!(book.contains("- OUTPUT PARAMETER {greeting}"), "{}", book);
        assert!(book.contains("## Greet\n\n- SIMPLE SECTION"), "{}", book);
        assert!(book.contains("```\nHello {name}\n```\n\n-> {greeting}"), "{}", book);
    }
}
