//! Constants shared by the parser and the compiler

/// Parameter names reserved for values the runtime injects into every task
pub const RESERVED_PARAMETER_NAMES: &[&str] = &[
    "content",
    "context",
    "knowledge",
    "examples",
    "modelName",
    "currentDate",
];

/// Languages a script task may be written in
pub const SUPPORTED_SCRIPT_LANGUAGES: &[&str] = &["javascript", "typescript", "python"];

/// Title used for a book (or a leading chunk) without any heading
pub const DEFAULT_BOOK_TITLE: &str = "Untitled";

/// Formfactor assigned when neither a command nor an abstraction chose one
pub const DEFAULT_FORMFACTOR_NAME: &str = "GENERIC";

/// Output subparameter name used by `FOREACH Text Line` when none is given
pub const DEFAULT_FOREACH_OUTPUT_SUBPARAMETER: &str = "newLine";

/// Value of `sources[].type` for books compiled from markdown
pub const BOOK_SOURCE_TYPE: &str = "BOOK";

/// Check whether the name is a reserved parameter name
pub fn is_reserved_parameter_name(name: &str) -> bool {
    RESERVED_PARAMETER_NAMES.contains(&name)
}

/// Resolve a code block language tag to one of the supported script languages
///
/// Common short tags (`js`, `ts`, `py`) are accepted as well.
pub fn normalize_script_language(language: &str) -> Option<&'static str> {
    match language.trim().to_lowercase().as_str() {
        "javascript" | "js" => Some("javascript"),
        "typescript" | "ts" => Some("typescript"),
        "python" | "py" => Some("python"),
        _ => None,
    }
}
