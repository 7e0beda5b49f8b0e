//! Formfactor definitions
//!
//! A formfactor names the interface of a pipeline: which input and output
//! parameters an application can expect. Pipelines without an explicit
//! `FORMFACTOR` command get theirs inferred from their parameters.

/// A parameter of a formfactor interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormfactorParameter {
    pub name: &'static str,
    pub description: &'static str,
}

/// A known pipeline interface
#[derive(Debug, Clone, Copy)]
pub struct FormfactorDefinition {
    pub name: &'static str,
    pub alias_names: &'static [&'static str],
    pub description: &'static str,
    pub input_parameters: &'static [FormfactorParameter],
    pub output_parameters: &'static [FormfactorParameter],
}

impl FormfactorDefinition {
    /// Whether the interface declares no parameters at all
    ///
    /// Such formfactors are never inferred.
    pub fn has_empty_interface(&self) -> bool {
        self.input_parameters.is_empty() && self.output_parameters.is_empty()
    }

    pub fn input_names(&self) -> impl Iterator<Item = &'static str> {
        self.input_parameters.iter().map(|p| p.name)
    }

    pub fn output_names(&self) -> impl Iterator<Item = &'static str> {
        self.output_parameters.iter().map(|p| p.name)
    }
}

const fn param(name: &'static str, description: &'static str) -> FormfactorParameter {
    FormfactorParameter { name, description }
}

pub const GENERIC_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "GENERIC",
    alias_names: &[],
    description: "A generic pipeline without any specific interface",
    input_parameters: &[],
    output_parameters: &[],
};

pub const CHATBOT_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "CHATBOT",
    alias_names: &["CHAT"],
    description: "Chatbot answering the user and keeping a summary of the conversation",
    input_parameters: &[
        param("previousTitle", "Previous title of the conversation"),
        param("previousConversationSummary", "Previous conversation summary"),
        param("userMessage", "User message"),
    ],
    output_parameters: &[
        param("title", "Title of the conversation"),
        param("chatbotResponse", "Chatbot response"),
        param("conversationSummary", "Summary of the conversation"),
    ],
};

pub const COMPLETION_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "COMPLETION",
    alias_names: &[],
    description: "Continues the given text",
    input_parameters: &[param("inputText", "Text to be completed")],
    output_parameters: &[param("outputText", "Completed text")],
};

pub const TRANSLATOR_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "TRANSLATOR",
    alias_names: &[],
    description: "Translates the input message",
    input_parameters: &[param("inputMessage", "Message to be translated")],
    output_parameters: &[param("outputMessage", "Translated message")],
};

pub const SHEETS_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "SHEETS",
    alias_names: &["SHEET", "TABLE"],
    description: "Transforms one table into another",
    input_parameters: &[param("inputSheet", "Input table as CSV")],
    output_parameters: &[param("outputSheet", "Output table as CSV")],
};

pub const IMAGE_GENERATOR_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "IMAGE_GENERATOR",
    alias_names: &[],
    description: "Generates an image from the prompt",
    input_parameters: &[param("prompt", "Description of the image")],
    output_parameters: &[param("image", "Generated image")],
};

pub const GENERATOR_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "GENERATOR",
    alias_names: &[],
    description: "Generates content from free-form parameters",
    input_parameters: &[],
    output_parameters: &[],
};

pub const MATCHER_FORMFACTOR: FormfactorDefinition = FormfactorDefinition {
    name: "MATCHER",
    alias_names: &[],
    description: "Evaluates how well the inputs match",
    input_parameters: &[],
    output_parameters: &[],
};

/// All known formfactors, in inference order
pub const FORMFACTOR_DEFINITIONS: &[FormfactorDefinition] = &[
    GENERIC_FORMFACTOR,
    CHATBOT_FORMFACTOR,
    COMPLETION_FORMFACTOR,
    TRANSLATOR_FORMFACTOR,
    SHEETS_FORMFACTOR,
    IMAGE_GENERATOR_FORMFACTOR,
    GENERATOR_FORMFACTOR,
    MATCHER_FORMFACTOR,
];

/// Find a formfactor by its SCREAMING_SNAKE_CASE name or alias
pub fn find_formfactor(name: &str) -> Option<&'static FormfactorDefinition> {
    FORMFACTOR_DEFINITIONS
        .iter()
        .find(|f| f.name == name || f.alias_names.contains(&name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_alias() {
        assert_eq!(find_formfactor("CHAT").map(|f| f.name), Some("CHATBOT"));
        assert_eq!(find_formfactor("TRANSLATOR").map(|f| f.name), Some("TRANSLATOR"));
        assert!(find_formfactor("POEM").is_none());
    }

    #[test]
    fn test_empty_interfaces() {
        assert!(GENERIC_FORMFACTOR.has_empty_interface());
        assert!(MATCHER_FORMFACTOR.has_empty_interface());
        assert!(!CHATBOT_FORMFACTOR.has_empty_interface());
        assert_eq!(CHATBOT_FORMFACTOR.output_names().count(), 3);
    }
}
