//! Pipeline assembler
//!
//! Applies the commands of a parsed book to a [`PipelineBuilder`], computes
//! task dependencies, resolves parameter roles and freezes the result.

mod closure;

pub use closure::resolve_parameter_roles;

use crate::abstraction::apply_high_level_abstractions;
use crate::compiler::CompilerOptions;
use crate::error::{CompileError, Result};
use crate::semantic::extract_parameter_names_from_task;
use crate::semantic::ScriptLimits;
use log::debug;
use promptbook_core::constants::{
    normalize_script_language, BOOK_SOURCE_TYPE, DEFAULT_FORMFACTOR_NAME,
    SUPPORTED_SCRIPT_LANGUAGES,
};
use promptbook_core::model::PipelineSource;
use promptbook_core::naming::validate_parameter_name;
use promptbook_core::{
    Command, ParameterBuilder, PipelineBuilder, PipelineJson, SectionType, TaskBuilder, TaskJson,
    TaskType,
};
use promptbook_parser::{
    BookDocument, BookParser, BookSection, CommandParser, CommandRegistry, ParsedCommand,
    UsagePlace,
};

/// Assemble a parsed book into a pipeline
pub fn assemble_pipeline(document: &BookDocument, options: &CompilerOptions) -> Result<PipelineJson> {
    let mut assembler = PipelineAssembler::new(document, options);

    if let Err(error) = assembler.apply_book(document) {
        return Err(error.in_pipeline(assembler.pipeline.pipeline_url.as_deref()));
    }

    let url = assembler.pipeline.pipeline_url.clone();
    assembler
        .finish()
        .map_err(|error| error.in_pipeline(url.as_deref()))
}

struct PipelineAssembler<'a> {
    pipeline: PipelineBuilder,
    registry: &'static CommandRegistry,
    options: &'a CompilerOptions,
    limits: ScriptLimits,
}

impl<'a> PipelineAssembler<'a> {
    fn new(document: &BookDocument, options: &'a CompilerOptions) -> Self {
        let mut pipeline = PipelineBuilder::new(document.head.title.clone());
        pipeline.description = document.head.description.clone();
        pipeline.sources.push(PipelineSource {
            source_type: BOOK_SOURCE_TYPE.to_string(),
            path: None,
            content: document.source.clone(),
        });

        Self {
            pipeline,
            registry: CommandRegistry::global(),
            options,
            limits: options.script_limits(),
        }
    }

    fn apply_book(&mut self, document: &BookDocument) -> Result<()> {
        let head = BookParser::parse_commands(&document.head.command_lines, UsagePlace::PipelineHead)?;
        for parsed in &head {
            self.apply_head_command(parsed)?;
        }

        for section in &document.sections {
            self.apply_section(section)?;
        }

        Ok(())
    }

    fn parser_for(&self, parsed: &ParsedCommand) -> Result<&'static dyn CommandParser> {
        self.registry.parser_for(&parsed.command).ok_or_else(|| {
            CompileError::Structural(format!(
                "No parser owns the {} command \"{}\"",
                parsed.command.type_name(),
                parsed.raw
            ))
        })
    }

    fn apply_head_command(&mut self, parsed: &ParsedCommand) -> Result<()> {
        let parser = self.parser_for(parsed)?;

        parser
            .apply_to_pipeline(&parsed.command, &mut self.pipeline)
            .map_err(|error| CompileError::Semantic {
                message: error.to_string(),
                task_snapshot: pipeline_snapshot(&self.pipeline),
                raw_command: parsed.raw.clone(),
                usage: usage_of(parser),
            })
    }

    fn apply_section(&mut self, section: &BookSection) -> Result<()> {
        let mut task = TaskBuilder::new(section.name.clone(), section.title.clone());
        task.description = section.description.clone();
        task.content = section.content.clone();
        task.content_language = section.content_language.clone();
        let resulting_parameter_name = section
            .resulting_parameter_name
            .as_deref()
            .map(validate_parameter_name)
            .transpose()
            .map_err(|error| section_error(section, &task.snapshot(), error.to_string()))?;
        task.resulting_parameter_name = resulting_parameter_name;

        let mut commands = BookParser::parse_commands(&section.command_lines, UsagePlace::PipelineTask)?;
        if !commands
            .iter()
            .any(|parsed| matches!(parsed.command, Command::Section { .. }))
        {
            debug!(
                "Section \"{}\" has no section type, defaulting to a prompt",
                section.title
            );
            commands.insert(
                0,
                ParsedCommand {
                    raw: "SECTION PROMPT".to_string(),
                    command: Command::Section {
                        section_type: SectionType::Prompt,
                    },
                },
            );
        }

        for parsed in &commands {
            let parser = self.parser_for(parsed)?;
            parser
                .apply_to_task(&parsed.command, &mut task, &mut self.pipeline)
                .map_err(|error| CompileError::Semantic {
                    message: error.to_string(),
                    task_snapshot: task.snapshot(),
                    raw_command: parsed.raw.clone(),
                    usage: usage_of(parser),
                })?;
        }

        let snapshot = task.snapshot();
        let Some(mut built) = task.build() else {
            debug!("Section \"{}\" is not a task", section.title);
            return Ok(());
        };

        if self.pipeline.has_task(&built.name) {
            return Err(section_error(
                section,
                &snapshot,
                format!(
                    "Task name \"{}\" is already used by another section, rename the section \"{}\"",
                    built.name, section.title
                ),
            ));
        }

        if built.task_type == TaskType::Script {
            let language = built.content_language.as_deref().unwrap_or_default();
            let Some(normalized) = normalize_script_language(language) else {
                return Err(section_error(
                    section,
                    &snapshot,
                    format!(
                        "Script section \"{}\" must be written in a code block marked with one of the supported languages: {}",
                        section.title,
                        SUPPORTED_SCRIPT_LANGUAGES.join(", ")
                    ),
                ));
            };
            built.content_language = Some(normalized.to_string());
        } else {
            built.content_language = None;
        }

        self.register_task_parameters(&mut built, section, &snapshot)?;

        debug!(
            "Section \"{}\" compiled into {} \"{}\"",
            section.title,
            built.task_type.as_str(),
            built.name
        );
        self.pipeline.tasks.push(built);
        Ok(())
    }

    fn register_task_parameters(
        &mut self,
        task: &mut TaskJson,
        section: &BookSection,
        snapshot: &str,
    ) -> Result<()> {
        let dependencies = extract_parameter_names_from_task(task, &self.limits)?;
        task.dependent_parameter_names = dependencies.into_iter().collect();

        let names = task
            .dependent_parameter_names
            .iter()
            .chain(task.resulting_parameter_name.iter());

        for name in names {
            self.pipeline
                .define_parameter(ParameterBuilder::new(name.clone()))
                .map_err(|error| section_error(section, snapshot, error.to_string()))?;
        }

        Ok(())
    }

    fn finish(mut self) -> Result<PipelineJson> {
        resolve_parameter_roles(&mut self.pipeline);

        let mut pipeline = self.pipeline.build();

        if self.options.enable_high_level_abstractions {
            apply_high_level_abstractions(&mut pipeline);
        }

        pipeline
            .formfactor_name
            .get_or_insert_with(|| DEFAULT_FORMFACTOR_NAME.to_string());

        Ok(pipeline)
    }
}

fn pipeline_snapshot(pipeline: &PipelineBuilder) -> String {
    serde_json::to_string_pretty(pipeline).unwrap_or_else(|_| format!("{:?}", pipeline))
}

fn usage_of(parser: &dyn CommandParser) -> Vec<String> {
    parser.examples().iter().map(|e| e.to_string()).collect()
}

fn section_error(section: &BookSection, snapshot: &str, message: String) -> CompileError {
    CompileError::Semantic {
        message,
        task_snapshot: snapshot.to_string(),
        raw_command: format!("## {}", section.title),
        usage: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbook_core::ParameterRole;

    fn assemble(book: &str) -> Result<PipelineJson> {
        let document = BookParser::parse(book)?;
        assemble_pipeline(&document, &CompilerOptions::default())
    }

    #[test]
    fn test_minimal_book() {
        let pipeline = assemble("# T\n\n- PARAMETER {x} desc\n\n## Do\n\nSay {x}\n\n-> {y}").unwrap();

        assert_eq!(pipeline.tasks.len(), 1);
        let task = &pipeline.tasks[0];
        assert_eq!(task.name, "do");
        assert_eq!(task.task_type, TaskType::Prompt);
        assert_eq!(task.dependent_parameter_names, vec!["x"]);
        assert_eq!(pipeline.parameter("x").map(|p| p.role), Some(ParameterRole::Input));
        assert_eq!(pipeline.parameter("y").map(|p| p.role), Some(ParameterRole::Output));
        assert_eq!(pipeline.formfactor(), "GENERIC");
        assert_eq!(pipeline.sources[0].source_type, "BOOK");
    }

    #[test]
    fn test_duplicate_task_names() {
        let result = assemble("# T\n\n## Do\n\nSay hi\n\n-> {a}\n\n## Do\n\nSay bye\n\n-> {b}");
        let error = result.unwrap_err();
        assert!(error.to_string().contains("already used"), "{}", error);
    }

    #[test]
    fn test_script_language_is_normalized() {
        let book = "# T\n\n## Shout\n\n- SCRIPT SECTION\n\n```js\nreturn text.toUpperCase();\n```\n\n-> {loud}";
        let pipeline = assemble(book).unwrap();

        let task = &pipeline.tasks[0];
        assert_eq!(task.content_language.as_deref(), Some("javascript"));
        assert_eq!(task.dependent_parameter_names, vec!["text"]);
    }

    #[test]
    fn test_script_without_language() {
        let book = "# T\n\n## Shout\n\n- SCRIPT SECTION\n\n```\nreturn text;\n```\n\n-> {loud}";
        let error = assemble(book).unwrap_err();
        assert!(error.to_string().contains("supported languages"), "{}", error);
    }

    #[test]
    fn test_errors_mention_the_pipeline_url() {
        let book = "# T\n\n- URL https://example.com/t.book\n\n## Do\n\n- PROMPT SECTION\n- SIMPLE SECTION\n\nSay hi\n\n-> {a}";
        let error = assemble(book).unwrap_err();

        assert!(matches!(error, CompileError::InPipeline { .. }));
        assert!(matches!(error.root(), CompileError::Semantic { .. }));
        assert!(error.to_string().contains("https://example.com/t.book"));
    }

    #[test]
    fn test_example_section_is_not_a_task() {
        let book = "# T\n\n- INPUT PARAMETER {topic} Topic\n\n## Example\n\n- EXAMPLE SECTION\n\n> Cats\n\n-> {topic}\n\n## Write\n\nWrite about {topic}\n\n-> {text}";
        let pipeline = assemble(book).unwrap();

        assert_eq!(pipeline.tasks.len(), 1);
        assert_eq!(
            pipeline.parameter("topic").map(|p| p.example_values.clone()),
            Some(vec!["Cats".to_string()])
        );
    }
}
