//! Name normalization helpers
//!
//! Commands are matched on a SCREAMING_SNAKE_CASE form of the line, task names
//! are kebab-case forms of the section titles.

use crate::constants::is_reserved_parameter_name;
use crate::error::{CoreError, Result};

/// Fold accented Latin letters into their ASCII base letters
pub fn remove_diacritics(text: &str) -> String {
    let mut result = String::with_capacity(text.len());

    for c in text.chars() {
        if c.is_ascii() {
            result.push(c);
            continue;
        }

        let lower = c.to_lowercase().next().unwrap_or(c);
        let folded = match lower {
            'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' | 'ā' | 'ą' => "a",
            'č' | 'ć' | 'ç' => "c",
            'ď' | 'đ' => "d",
            'é' | 'è' | 'ê' | 'ë' | 'ě' | 'ē' | 'ę' => "e",
            'í' | 'ì' | 'î' | 'ï' | 'ī' => "i",
            'ľ' | 'ĺ' | 'ł' => "l",
            'ň' | 'ñ' | 'ń' => "n",
            'ó' | 'ò' | 'ô' | 'ö' | 'õ' | 'ø' | 'ō' | 'ő' => "o",
            'ř' | 'ŕ' => "r",
            'š' | 'ś' | 'ş' => "s",
            'ß' => "ss",
            'ť' | 'ţ' => "t",
            'ú' | 'ù' | 'û' | 'ü' | 'ů' | 'ū' | 'ű' => "u",
            'ý' | 'ÿ' => "y",
            'ž' | 'ź' | 'ż' => "z",
            _ => {
                result.push(c);
                continue;
            }
        };

        if c.is_uppercase() {
            result.push_str(&folded.to_uppercase());
        } else {
            result.push_str(folded);
        }
    }

    result
}

/// Split text into alphanumeric words, breaking on camelCase boundaries
fn split_words(text: &str) -> Vec<String> {
    let text = remove_diacritics(text);
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut previous_is_lower = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if c.is_ascii_uppercase() && previous_is_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.push(c);
            previous_is_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        } else {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_is_lower = false;
        }
    }

    if !current.is_empty() {
        words.push(current);
    }

    words
}

/// Normalize text to SCREAMING_SNAKE_CASE
///
/// `"Expect max 5 chars"` becomes `"EXPECT_MAX_5_CHARS"`, `"maxTokens"` becomes
/// `"MAX_TOKENS"`.
pub fn normalize_to_screaming_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|word| word.to_uppercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Normalize text to kebab-case
pub fn normalize_to_kebab_case(text: &str) -> String {
    split_words(text)
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Derive a task name from its section title
pub fn title_to_name(title: &str) -> String {
    let name = normalize_to_kebab_case(title);
    if name.is_empty() {
        "untitled".to_string()
    } else {
        name
    }
}

/// Check that the text is a plain identifier usable as a function name
pub fn is_valid_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Validate a parameter reference like `{topic}` and return the bare name
pub fn validate_parameter_name(raw: &str) -> Result<String> {
    let invalid = |message: &str| CoreError::InvalidParameterName {
        name: raw.to_string(),
        message: message.to_string(),
    };

    let mut name = raw.trim();
    if let Some(inner) = name.strip_prefix('`').and_then(|n| n.strip_suffix('`')) {
        name = inner.trim();
    }

    if name.starts_with('{') != name.ends_with('}') {
        return Err(invalid("curly braces are not balanced"));
    }
    let name = name
        .strip_prefix('{')
        .and_then(|n| n.strip_suffix('}'))
        .unwrap_or(name)
        .trim();

    if name.is_empty() {
        return Err(invalid("parameter name is empty"));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(invalid("parameter name can not contain whitespace"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid(
            "parameter name can contain only letters, digits and underscores",
        ));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(invalid("parameter name can not start with a digit"));
    }
    if is_reserved_parameter_name(name) {
        return Err(CoreError::ReservedParameterName(name.to_string()));
    }

    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screaming_case() {
        assert_eq!(normalize_to_screaming_case("Expect max 5 chars"), "EXPECT_MAX_5_CHARS");
        assert_eq!(normalize_to_screaming_case("maxTokens"), "MAX_TOKENS");
        assert_eq!(normalize_to_screaming_case("**PARAMETER**"), "PARAMETER");
        assert_eq!(normalize_to_screaming_case("gpt-4"), "GPT_4");
        assert_eq!(normalize_to_screaming_case("  "), "");
    }

    #[test]
    fn test_kebab_case_and_titles() {
        assert_eq!(normalize_to_kebab_case("Write a Poem"), "write-a-poem");
        assert_eq!(title_to_name("Do"), "do");
        assert_eq!(title_to_name("Přeložit článek!"), "prelozit-clanek");
        assert_eq!(title_to_name("🎯"), "untitled");
    }

    #[test]
    fn test_identifier() {
        assert!(is_valid_identifier("unwrapResult"));
        assert!(is_valid_identifier("$trim_1"));
        assert!(!is_valid_identifier("1trim"));
        assert!(!is_valid_identifier("trim end"));
    }

    #[test]
    fn test_validate_parameter_name() {
        assert_eq!(validate_parameter_name("{topic}").unwrap(), "topic");
        assert_eq!(validate_parameter_name("`{topic}`").unwrap(), "topic");
        assert_eq!(validate_parameter_name("topic").unwrap(), "topic");

        assert!(validate_parameter_name("{topic").is_err());
        assert!(validate_parameter_name("{my topic}").is_err());
        assert!(validate_parameter_name("{1st}").is_err());
        assert!(validate_parameter_name("{}").is_err());
        assert_eq!(
            validate_parameter_name("{context}"),
            Err(CoreError::ReservedParameterName("context".to_string()))
        );
    }
}
