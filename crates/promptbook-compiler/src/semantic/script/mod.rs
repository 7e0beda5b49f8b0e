//! Free variable discovery in script sections
//!
//! Scripts are never executed. Each supported language has a small lexer and
//! a two pass walk over its tokens: the first pass collects every name the
//! script declares, the second collects names it reads. What is read but
//! neither declared nor built in is a parameter of the script.
//!
//! Scopes are flattened, a name declared anywhere in the script counts as
//! declared everywhere.

mod javascript;
mod python;

use crate::error::{CompileError, Result};
use log::debug;
use promptbook_core::constants::normalize_script_language;
use std::collections::BTreeSet;

/// Hard bounds of the script analysis, exceeding them is fatal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptLimits {
    /// Maximum number of distinct identifiers in one script
    pub max_identifiers: usize,
    /// Maximum nesting of template literals and f-string expressions
    pub max_nesting: usize,
}

impl Default for ScriptLimits {
    fn default() -> Self {
        Self {
            max_identifiers: 256,
            max_nesting: 32,
        }
    }
}

/// Lexical token shared by the script lexers
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Identifier(String),
    Punct(&'static str),
    /// String, number or regular expression literal
    Literal,
    /// End of a logical line, emitted only by the Python lexer
    Newline,
}

impl Token {
    pub(crate) fn is_punct(&self, punct: &str) -> bool {
        matches!(self, Token::Punct(p) if *p == punct)
    }

    pub(crate) fn identifier(&self) -> Option<&str> {
        match self {
            Token::Identifier(name) => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Names the script reads without declaring them
pub fn extract_script_variables(
    script: &str,
    language: &str,
    limits: &ScriptLimits,
) -> Result<BTreeSet<String>> {
    let variables = match normalize_script_language(language) {
        Some("javascript") => javascript::free_variables(script, limits, false)?,
        Some("typescript") => javascript::free_variables(script, limits, true)?,
        Some("python") => python::free_variables(script, limits)?,
        _ => {
            return Err(CompileError::ScriptAnalysis(format!(
                "Script language \"{}\" is not supported",
                language
            )))
        }
    };

    debug!(
        "Script in {} reads {} free variables",
        language,
        variables.len()
    );
    Ok(variables)
}

/// Fail when the script has more distinct identifiers than allowed
pub(crate) fn check_identifier_limit(tokens: &[Token], limits: &ScriptLimits) -> Result<()> {
    let distinct: BTreeSet<&str> = tokens.iter().filter_map(Token::identifier).collect();

    if distinct.len() > limits.max_identifiers {
        return Err(CompileError::ScriptAnalysis(format!(
            "Script has {} distinct identifiers, the analysis is limited to {}",
            distinct.len(),
            limits.max_identifiers
        )));
    }
    Ok(())
}

/// Fail when a nested expression goes deeper than allowed
pub(crate) fn check_nesting(depth: usize, limits: &ScriptLimits) -> Result<()> {
    if depth > limits.max_nesting {
        return Err(CompileError::ScriptAnalysis(format!(
            "Script nests expressions deeper than {} levels",
            limits.max_nesting
        )));
    }
    Ok(())
}

/// Index of the bracket closing the one at `open`
pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token {
            Token::Punct("(" | "[" | "{") => depth += 1,
            Token::Punct(")" | "]" | "}") => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

/// Index of the bracket opening the one at `close`
pub(crate) fn matching_open(tokens: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for index in (0..=close).rev() {
        match &tokens[index] {
            Token::Punct(")" | "]" | "}") => depth += 1,
            Token::Punct("(" | "[" | "{") => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_by_language() {
        let limits = ScriptLimits::default();

        let js = extract_script_variables("return text.toUpperCase()", "js", &limits).unwrap();
        assert_eq!(js.into_iter().collect::<Vec<_>>(), vec!["text"]);

        let py = extract_script_variables("return name.upper()", "Python", &limits).unwrap();
        assert_eq!(py.into_iter().collect::<Vec<_>>(), vec!["name"]);

        assert!(extract_script_variables("puts x", "ruby", &limits).is_err());
    }

    #[test]
    fn test_identifier_limit() {
        let limits = ScriptLimits {
            max_identifiers: 3,
            max_nesting: 32,
        };
        let result = extract_script_variables("return a + b + c + d", "javascript", &limits);
        assert!(matches!(result, Err(CompileError::ScriptAnalysis(_))));
    }
}
