//! Chatbot scaffold for persona-only books
//!
//! A book with a persona and nothing else becomes a complete chatbot: the
//! persona answers the user, the conversation is summarized and titled.

use super::HighLevelAbstraction;
use log::debug;
use promptbook_core::formfactor::{FormfactorParameter, CHATBOT_FORMFACTOR};
use promptbook_core::{
    ExpectationAmount, ExpectationUnit, ParameterJson, ParameterRole, PipelineJson, TaskJson,
    TaskType,
};

const ANSWER_CONTENT: &str = "Write a response to the user message:\n\n**Question from user**\n\n> {userMessage}\n\n**Previous conversation**\n\n> {previousConversationSummary}";

const SUMMARY_CONTENT: &str = "Summarize the conversation in a few words:\n\n## User\n\n> {userMessage}\n\n## You\n\n> {chatbotResponse}";

/// Scaffolds the chatbot tasks around the first persona
pub struct QuickChatbot;

impl QuickChatbot {
    fn parameter(definition: &FormfactorParameter, role: ParameterRole) -> ParameterJson {
        ParameterJson::new(definition.name, role).with_description(definition.description)
    }

    fn task(
        name: &str,
        title: &str,
        task_type: TaskType,
        content: &str,
        dependencies: &[&str],
        result: &str,
    ) -> TaskJson {
        let mut task = TaskJson::new(name, title, task_type, content);
        task.dependent_parameter_names = dependencies.iter().map(|d| d.to_string()).collect();
        task.resulting_parameter_name = Some(result.to_string());
        task
    }
}

impl HighLevelAbstraction for QuickChatbot {
    fn name(&self) -> &'static str {
        "quick chatbot"
    }

    fn apply(&self, pipeline: &mut PipelineJson) {
        let formfactor_allows = pipeline
            .formfactor_name
            .as_deref()
            .map_or(true, |name| name == CHATBOT_FORMFACTOR.name);

        if !formfactor_allows || !pipeline.parameters.is_empty() || !pipeline.tasks.is_empty() {
            return;
        }
        let Some(persona) = pipeline.personas.first().map(|p| p.name.clone()) else {
            return;
        };

        debug!(
            "Pipeline \"{}\" only defines the persona {}, scaffolding a chatbot",
            pipeline.title, persona
        );

        let mut answer = Self::task(
            "create-an-answer",
            "Create an answer",
            TaskType::Prompt,
            ANSWER_CONTENT,
            &["previousConversationSummary", "userMessage"],
            "chatbotResponse",
        );
        answer.persona_name = Some(persona.clone());

        let mut summary = Self::task(
            "summarize-the-conversation",
            "Summarize the conversation",
            TaskType::Prompt,
            SUMMARY_CONTENT,
            &["chatbotResponse", "userMessage"],
            "conversationSummary",
        );
        summary.persona_name = Some(persona);
        summary.expectations.insert(
            ExpectationUnit::Words,
            ExpectationAmount {
                min: Some(1),
                max: Some(10),
            },
        );

        let title = Self::task(
            "title",
            "Title",
            TaskType::Simple,
            "{conversationSummary}",
            &["conversationSummary"],
            "title",
        );

        pipeline.tasks = vec![answer, summary, title];
        pipeline.parameters = CHATBOT_FORMFACTOR
            .input_parameters
            .iter()
            .map(|p| Self::parameter(p, ParameterRole::Input))
            .chain(
                CHATBOT_FORMFACTOR
                    .output_parameters
                    .iter()
                    .map(|p| Self::parameter(p, ParameterRole::Output)),
            )
            .collect();
        pipeline.formfactor_name = Some(CHATBOT_FORMFACTOR.name.to_string());
    }
}
