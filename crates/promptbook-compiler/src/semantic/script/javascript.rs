//! JavaScript and TypeScript lexer

use super::{
    check_identifier_limit, check_nesting, matching_close, matching_open, ScriptLimits, Token,
};
use crate::error::{CompileError, Result};
use std::collections::{BTreeSet, HashSet};

const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger",
    "default", "delete", "do", "else", "export", "extends", "false", "finally", "for", "from",
    "function", "get", "if", "import", "in", "instanceof", "let", "new", "null", "of", "return",
    "set", "static", "super", "switch", "this", "throw", "true", "try", "typeof", "undefined",
    "var", "void", "while", "with", "yield", "arguments", "NaN", "Infinity",
];

/// Keywords after which a `/` starts a regular expression
const EXPRESSION_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "instanceof", "yield", "await",
];

const GLOBALS: &[&str] = &[
    "Math", "JSON", "console", "Object", "Array", "String", "Number", "Boolean", "Date",
    "RegExp", "Error", "TypeError", "RangeError", "Promise", "Map", "Set", "WeakMap", "WeakSet",
    "Symbol", "BigInt", "Intl", "parseInt", "parseFloat", "isNaN", "isFinite",
    "encodeURIComponent", "decodeURIComponent", "encodeURI", "decodeURI", "globalThis",
    "setTimeout", "clearTimeout", "structuredClone",
    // Text utilities available to every script
    "spaceTrim", "removeQuotes", "unwrapResult", "trimEndOfCodeBlock", "trimCodeBlock", "trim",
    "reverse", "removeEmojis", "prettifyMarkdown", "capitalize", "decapitalize",
    "nameToUriPart", "nameToUriParts", "removeDiacritics", "normalizeTo_SCREAMING_CASE",
    "normalizeTo_camelCase", "normalizeTo_kebab_case", "normalizeTo_PascalCase",
    "normalizeTo_snake_case", "normalizeWhitespaces", "parseKeywords", "isValidJsonString",
    "extractAllItemsFromMarkdown", "extractAllListItemsFromMarkdown",
    "extractOneBlockFromMarkdown", "extractBlock", "countCharacters", "countLines",
    "countPages", "countParagraphs", "countSentences", "countWords",
];

const TYPESCRIPT_TYPES: &[&str] = &[
    "string", "number", "boolean", "any", "unknown", "never", "object", "Record", "Partial",
    "Readonly", "Array", "type", "interface", "as",
];

const MULTI_CHAR_PUNCT: &[&str] = &["...", "=>", "?."];

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    limits: &'a ScriptLimits,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &str, depth: usize, limits: &'a ScriptLimits) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            depth,
            limits,
            tokens: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(offset, c)| self.peek(offset) == Some(c))
    }

    fn regex_allowed(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(Token::Punct(p)) => !matches!(*p, ")" | "]" | "}"),
            Some(Token::Identifier(name)) => EXPRESSION_KEYWORDS.contains(&name.as_str()),
            Some(_) => false,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        check_nesting(self.depth, self.limits)?;

        while let Some(c) = self.peek(0) {
            if c.is_whitespace() {
                self.pos += 1;
            } else if self.starts_with("//") {
                self.skip_while(|c| c != '\n');
            } else if self.starts_with("/*") {
                self.skip_block_comment();
            } else if c == '"' || c == '\'' {
                self.skip_string(c);
                self.tokens.push(Token::Literal);
            } else if c == '`' {
                self.template_literal()?;
            } else if c == '/' && self.regex_allowed() {
                self.skip_regex();
                self.tokens.push(Token::Literal);
            } else if c.is_ascii_digit() {
                self.skip_while(|c| c.is_alphanumeric() || c == '.' || c == '_');
                self.tokens.push(Token::Literal);
            } else if c.is_alphabetic() || c == '_' || c == '$' {
                let start = self.pos;
                self.skip_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
                let name: String = self.chars[start..self.pos].iter().collect();
                self.tokens.push(Token::Identifier(name));
            } else if let Some(punct) = MULTI_CHAR_PUNCT.iter().find(|p| self.starts_with(p)) {
                self.pos += punct.chars().count();
                self.tokens.push(Token::Punct(*punct));
            } else {
                self.pos += 1;
                self.tokens.push(Token::Punct(single_char_punct(c)));
            }
        }

        Ok(self.tokens)
    }

    fn skip_while(&mut self, predicate: impl Fn(char) -> bool) {
        while self.peek(0).is_some_and(&predicate) {
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2;
        while self.peek(0).is_some() && !self.starts_with("*/") {
            self.pos += 1;
        }
        self.pos = (self.pos + 2).min(self.chars.len());
    }

    fn skip_string(&mut self, quote: char) {
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                '\\' => self.pos += 1,
                '\n' => return,
                c if c == quote => return,
                _ => {}
            }
        }
    }

    fn skip_regex(&mut self) {
        self.pos += 1;
        let mut in_class = false;
        while let Some(c) = self.peek(0) {
            self.pos += 1;
            match c {
                '\\' => self.pos += 1,
                '[' => in_class = true,
                ']' => in_class = false,
                '/' if !in_class => break,
                '\n' => break,
                _ => {}
            }
        }
        self.skip_while(|c| c.is_ascii_alphabetic());
    }

    /// Template literal, the `${...}` parts are lexed as nested expressions
    fn template_literal(&mut self) -> Result<()> {
        self.pos += 1;
        while let Some(c) = self.peek(0) {
            match c {
                '\\' => self.pos += 2,
                '`' => {
                    self.pos += 1;
                    self.tokens.push(Token::Literal);
                    return Ok(());
                }
                '$' if self.peek(1) == Some('{') => {
                    self.pos += 2;
                    let expression = self.take_braced_expression()?;
                    let nested = Lexer::new(&expression, self.depth + 1, self.limits).tokenize()?;

                    self.tokens.push(Token::Literal);
                    self.tokens.push(Token::Punct("+"));
                    self.tokens.push(Token::Punct("("));
                    self.tokens.extend(nested);
                    self.tokens.push(Token::Punct(")"));
                    self.tokens.push(Token::Punct("+"));
                }
                _ => self.pos += 1,
            }
        }

        Err(CompileError::ScriptAnalysis(
            "Template literal is not terminated".to_string(),
        ))
    }

    fn take_braced_expression(&mut self) -> Result<String> {
        let start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.peek(0) {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let expression: String = self.chars[start..self.pos].iter().collect();
                        self.pos += 1;
                        return Ok(expression);
                    }
                }
                '`' => {
                    // Nested template literal inside the expression
                    let mut nested_depth = 0usize;
                    self.pos += 1;
                    while let Some(c) = self.peek(0) {
                        match c {
                            '\\' => self.pos += 1,
                            '{' if self.pos > 0 && self.chars[self.pos - 1] == '$' => nested_depth += 1,
                            '}' if nested_depth > 0 => nested_depth -= 1,
                            '`' if nested_depth == 0 => break,
                            _ => {}
                        }
                        self.pos += 1;
                    }
                }
                '"' | '\'' => {
                    self.skip_string(c);
                    continue;
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err(CompileError::ScriptAnalysis(
            "Template literal expression is not terminated".to_string(),
        ))
    }
}

fn single_char_punct(c: char) -> &'static str {
    match c {
        '(' => "(",
        ')' => ")",
        '[' => "[",
        ']' => "]",
        '{' => "{",
        '}' => "}",
        '.' => ".",
        ',' => ",",
        ';' => ";",
        ':' => ":",
        '=' => "=",
        '?' => "?",
        _ => "op",
    }
}

fn is_binding_position(previous: Option<&Token>) -> bool {
    matches!(
        previous,
        Some(Token::Punct("(" | "," | "..." | "{" | "["))
    )
}

/// Declare identifiers of a binding list between `open` and its closing bracket
fn declare_bindings(tokens: &[Token], open: usize, declared: &mut HashSet<String>) {
    let close = matching_close(tokens, open).unwrap_or(tokens.len().saturating_sub(1));

    for index in open + 1..close {
        let Some(name) = tokens[index].identifier() else {
            continue;
        };
        let is_key = tokens.get(index + 1).is_some_and(|t| t.is_punct(":"));
        if is_binding_position(index.checked_sub(1).map(|i| &tokens[i])) && !is_key {
            declared.insert(name.to_string());
        }
        // `{ key: alias }` declares the alias
        if index >= 2 && tokens[index - 1].is_punct(":") && tokens[index - 2].identifier().is_some() {
            declared.insert(name.to_string());
        }
    }
}

/// Method shorthand `name(params) {` in an object literal or class body
fn is_method_definition(tokens: &[Token], index: usize) -> bool {
    let Some(name) = tokens[index].identifier() else {
        return false;
    };
    if KEYWORDS.contains(&name) {
        return false;
    }
    let previous = index.checked_sub(1).map(|i| &tokens[i]);
    if previous.is_some_and(|t| t.is_punct(".") || t.is_punct("?.") || t.identifier() == Some("function")) {
        return false;
    }
    if !tokens.get(index + 1).is_some_and(|t| t.is_punct("(")) {
        return false;
    }
    matching_close(tokens, index + 1)
        .and_then(|close| tokens.get(close + 1))
        .is_some_and(|t| t.is_punct("{"))
}

/// Declare the names of a `let`/`const`/`var` statement starting at `start`
fn declare_variables(tokens: &[Token], start: usize, declared: &mut HashSet<String>) {
    let mut index = start;
    loop {
        match tokens.get(index) {
            Some(Token::Identifier(name)) => {
                declared.insert(name.clone());
            }
            Some(Token::Punct("{" | "[")) => {
                declare_bindings(tokens, index, declared);
                index = matching_close(tokens, index).unwrap_or(tokens.len());
            }
            _ => return,
        }

        // Find the next `,` on the same level, stop at the end of the statement
        let mut depth = 0i32;
        index += 1;
        loop {
            match tokens.get(index) {
                None => return,
                Some(Token::Punct("(" | "[" | "{")) => depth += 1,
                Some(Token::Punct(")" | "]" | "}")) => {
                    depth -= 1;
                    if depth < 0 {
                        return;
                    }
                }
                Some(Token::Punct(";")) if depth == 0 => return,
                Some(Token::Identifier(word)) if depth == 0 && (word == "of" || word == "in") => {
                    return
                }
                Some(Token::Punct(",")) if depth == 0 => {
                    index += 1;
                    break;
                }
                _ => {}
            }
            index += 1;
        }
    }
}

fn declared_names(tokens: &[Token]) -> HashSet<String> {
    let mut declared = HashSet::new();

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Identifier(word) => match word.as_str() {
                "let" | "const" | "var" => declare_variables(tokens, index + 1, &mut declared),
                "function" | "class" => {
                    let mut next = index + 1;
                    if let Some(name) = tokens.get(next).and_then(Token::identifier) {
                        declared.insert(name.to_string());
                        next += 1;
                    }
                    if word == "function" && tokens.get(next).is_some_and(|t| t.is_punct("(")) {
                        declare_bindings(tokens, next, &mut declared);
                    }
                }
                "catch" if tokens.get(index + 1).is_some_and(|t| t.is_punct("(")) => {
                    declare_bindings(tokens, index + 1, &mut declared);
                }
                _ if is_method_definition(tokens, index) => {
                    declare_bindings(tokens, index + 1, &mut declared);
                }
                _ => {}
            },
            Token::Punct("=>") => match index.checked_sub(1).map(|i| &tokens[i]) {
                Some(Token::Identifier(name)) => {
                    declared.insert(name.clone());
                }
                Some(Token::Punct(")")) => {
                    if let Some(open) = matching_open(tokens, index - 1) {
                        declare_bindings(tokens, open, &mut declared);
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    declared
}

/// Names read by the script that it does not declare
pub(super) fn free_variables(
    script: &str,
    limits: &ScriptLimits,
    typescript: bool,
) -> Result<BTreeSet<String>> {
    let tokens = Lexer::new(script, 0, limits).tokenize()?;
    check_identifier_limit(&tokens, limits)?;

    let declared = declared_names(&tokens);
    let mut free = BTreeSet::new();

    for (index, token) in tokens.iter().enumerate() {
        let Some(name) = token.identifier() else {
            continue;
        };
        if KEYWORDS.contains(&name)
            || GLOBALS.contains(&name)
            || (typescript && TYPESCRIPT_TYPES.contains(&name))
            || declared.contains(name)
        {
            continue;
        }

        let previous = index.checked_sub(1).map(|i| &tokens[i]);
        let next = tokens.get(index + 1);

        // Property access
        if previous.is_some_and(|t| t.is_punct(".") || t.is_punct("?.")) {
            continue;
        }
        // Method name, its parameters are declared
        if is_method_definition(&tokens, index) {
            continue;
        }
        // Object literal key
        if next.is_some_and(|t| t.is_punct(":"))
            && previous.is_some_and(|t| t.is_punct("{") || t.is_punct(","))
        {
            continue;
        }

        free.insert(name.to_string());
    }

    Ok(free)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free(script: &str) -> Vec<String> {
        free_variables(script, &ScriptLimits::default(), false)
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_declared_names_are_not_free() {
        let script = r#"
            const words = text.split(' ');
            let count = 0;
            for (const word of words) {
                count += word.length;
            }
            return count > limit ? spaceTrim(text) : '';
        "#;
        assert_eq!(free(script), vec!["limit", "text"]);
    }

    #[test]
    fn test_functions_and_arrows() {
        let script = r#"
            function shout(value, suffix = marker) {
                return value.toUpperCase() + suffix;
            }
            const items = list.map((item, i) => shout(item) + i);
            return items.filter(x => x !== skipped).join(', ');
        "#;
        assert_eq!(free(script), vec!["list", "marker", "skipped"]);
    }

    #[test]
    fn test_strings_comments_and_object_keys() {
        let script = r#"
            // name is mentioned only in a comment
            /* and title in a block comment */
            const result = { title: heading, "key": 'name', nested: { deep: value } };
            return JSON.stringify(result);
        "#;
        assert_eq!(free(script), vec!["heading", "value"]);
    }

    #[test]
    fn test_method_shorthand_is_not_free() {
        let script = "const helper = { shout(value) { return value.toUpperCase(); } }; return helper.shout(text);";
        assert_eq!(free(script), vec!["text"]);
    }

    #[test]
    fn test_class_methods_are_not_free() {
        let script = r#"
            class Greeter {
                static create() { return new Greeter(); }
                greet(who) { return 'Hi ' + who + suffix; }
            }
            return Greeter.create().greet(name);
        "#;
        assert_eq!(free(script), vec!["name", "suffix"]);
    }

    #[test]
    fn test_call_followed_by_block_is_still_a_call() {
        assert_eq!(free("if (check(input)) { return input; }"), vec!["check", "input"]);
    }

    #[test]
    fn test_destructuring() {
        let script = "const { first, second: alias } = pair; const [a, b] = both; return first + alias + a + b;";
        assert_eq!(free(script), vec!["both", "pair"]);
    }

    #[test]
    fn test_template_literals_are_scanned() {
        assert_eq!(free("return `Hello ${name}, you have ${count + 1} messages`"), vec!["count", "name"]);
        assert_eq!(free("return `outer ${`inner ${deep}`}`"), vec!["deep"]);
    }

    #[test]
    fn test_regex_literal_is_skipped() {
        assert_eq!(free("return text.replace(/[a-z]+/g, replacement)"), vec!["replacement", "text"]);
    }

    #[test]
    fn test_nesting_limit() {
        let limits = ScriptLimits {
            max_identifiers: 256,
            max_nesting: 1,
        };
        let result = free_variables("return `a ${`b ${`c ${x}`}`}`", &limits, false);
        assert!(matches!(result, Err(CompileError::ScriptAnalysis(_))));
    }

    #[test]
    fn test_typescript_types_are_not_free() {
        let variables = free_variables(
            "const size: number = input.length; return size as string;",
            &ScriptLimits::default(),
            true,
        )
        .unwrap();
        assert_eq!(variables.into_iter().collect::<Vec<_>>(), vec!["input"]);
    }
}
