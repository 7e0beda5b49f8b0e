//! Python lexer

use super::{check_identifier_limit, check_nesting, matching_close, ScriptLimits, Token};
use crate::error::{CompileError, Result};
use std::collections::{BTreeSet, HashSet};

const KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield", "self",
];

const BUILTINS: &[&str] = &[
    "print", "len", "range", "str", "int", "float", "bool", "list", "dict", "set", "tuple",
    "abs", "all", "any", "min", "max", "sum", "sorted", "reversed", "enumerate", "zip", "map",
    "filter", "isinstance", "type", "round", "repr", "format", "ord", "chr", "hex", "iter",
    "next", "super", "object", "Exception", "ValueError", "TypeError", "KeyError", "IndexError",
];

/// Statements whose header ends with `:`
const COMPOUND_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "while", "for", "with", "try", "except", "finally",
];

const MULTI_CHAR_PUNCT: &[&str] = &[
    "**=", "//=", "==", "!=", "<=", ">=", ":=", "->", "+=", "-=", "*=", "/=", "%=", "**", "//",
];

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
    bracket_depth: usize,
    limits: &'a ScriptLimits,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &str, depth: usize, limits: &'a ScriptLimits) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            depth,
            bracket_depth: 0,
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

    fn tokenize(mut self) -> Result<Vec<Token>> {
        check_nesting(self.depth, self.limits)?;

        while let Some(c) = self.peek(0) {
            if c == '\n' {
                self.pos += 1;
                if self.bracket_depth == 0 && !matches!(self.tokens.last(), Some(Token::Newline) | None) {
                    self.tokens.push(Token::Newline);
                }
            } else if c == '\\' && self.peek(1) == Some('\n') {
                self.pos += 2;
            } else if c.is_whitespace() {
                self.pos += 1;
            } else if c == '#' {
                while self.peek(0).is_some_and(|c| c != '\n') {
                    self.pos += 1;
                }
            } else if let Some((prefix_len, formatted)) = self.string_prefix() {
                self.pos += prefix_len;
                self.string(formatted)?;
                self.tokens.push(Token::Literal);
            } else if c.is_ascii_digit() {
                while self
                    .peek(0)
                    .is_some_and(|c| c.is_alphanumeric() || c == '.' || c == '_')
                {
                    self.pos += 1;
                }
                self.tokens.push(Token::Literal);
            } else if c.is_alphabetic() || c == '_' {
                let start = self.pos;
                while self.peek(0).is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    self.pos += 1;
                }
                let name: String = self.chars[start..self.pos].iter().collect();
                self.tokens.push(Token::Identifier(name));
            } else if let Some(punct) = MULTI_CHAR_PUNCT.iter().find(|p| self.starts_with(p)) {
                self.pos += punct.chars().count();
                self.tokens.push(Token::Punct(*punct));
            } else {
                self.pos += 1;
                let punct = single_char_punct(c);
                match punct {
                    "(" | "[" | "{" => self.bracket_depth += 1,
                    ")" | "]" | "}" => self.bracket_depth = self.bracket_depth.saturating_sub(1),
                    _ => {}
                }
                self.tokens.push(Token::Punct(punct));
            }
        }

        Ok(self.tokens)
    }

    /// Length of the string prefix (`f`, `rb`, ...) and whether it is an f-string
    fn string_prefix(&self) -> Option<(usize, bool)> {
        let mut length = 0;
        let mut formatted = false;
        while let Some(c) = self.peek(length) {
            match c {
                '"' | '\'' => return Some((length, formatted)),
                'f' | 'F' if length < 2 => formatted = true,
                'r' | 'R' | 'b' | 'B' | 'u' | 'U' if length < 2 => {}
                _ => return None,
            }
            length += 1;
        }
        None
    }

    /// Skip a string literal, lexing the expressions of f-strings
    fn string(&mut self, formatted: bool) -> Result<()> {
        let quote = self.peek(0).unwrap_or('"');
        let triple = self.peek(1) == Some(quote) && self.peek(2) == Some(quote);
        let delimiter: String = if triple {
            [quote; 3].iter().collect()
        } else {
            quote.to_string()
        };
        self.pos += delimiter.len();

        while let Some(c) = self.peek(0) {
            if self.starts_with(&delimiter) {
                self.pos += delimiter.len();
                return Ok(());
            }
            match c {
                '\\' => self.pos += 2,
                '\n' if !triple => return Ok(()),
                '{' if formatted && self.peek(1) == Some('{') => self.pos += 2,
                '{' if formatted => {
                    self.pos += 1;
                    let expression = self.take_replacement_field()?;
                    let nested = Lexer::new(&expression, self.depth + 1, self.limits).tokenize()?;

                    self.tokens.push(Token::Punct("("));
                    self.tokens.extend(nested.into_iter().filter(|t| *t != Token::Newline));
                    self.tokens.push(Token::Punct(")"));
                }
                _ => self.pos += 1,
            }
        }

        Ok(())
    }

    /// Expression of an f-string replacement field without its format spec
    fn take_replacement_field(&mut self) -> Result<String> {
        let start = self.pos;
        let mut depth = 1usize;
        let mut end = None;

        while let Some(c) = self.peek(0) {
            match c {
                '{' | '(' | '[' => depth += 1,
                ')' | ']' => depth = depth.saturating_sub(1),
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        let expression: String =
                            self.chars[start..end.unwrap_or(self.pos)].iter().collect();
                        self.pos += 1;
                        return Ok(expression);
                    }
                }
                ':' if depth == 1 && end.is_none() => end = Some(self.pos),
                '!' if depth == 1 && end.is_none() && self.peek(1) != Some('=') => {
                    end = Some(self.pos)
                }
                _ => {}
            }
            self.pos += 1;
        }

        Err(CompileError::ScriptAnalysis(
            "Replacement field of an f-string is not terminated".to_string(),
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
        '*' => "*",
        _ => "op",
    }
}

/// Index where the statement containing `index` starts
fn statement_start(tokens: &[Token], index: usize) -> usize {
    tokens[..index]
        .iter()
        .rposition(|t| *t == Token::Newline || t.is_punct(";"))
        .map(|position| position + 1)
        .unwrap_or(0)
}

/// Declare the targets of the assignment whose `=` is at `index`
fn declare_assignment_targets(tokens: &[Token], index: usize, declared: &mut HashSet<String>) {
    let mut start = statement_start(tokens, index);

    // `if ready: value = 1` assigns after the header
    if tokens
        .get(start)
        .and_then(Token::identifier)
        .is_some_and(|word| COMPOUND_KEYWORDS.contains(&word))
    {
        match tokens[start..index].iter().rposition(|t| t.is_punct(":")) {
            Some(colon) => start += colon + 1,
            None => return,
        }
    }

    // Brackets opened at a target position unpack, any other bracket subscripts or calls
    let mut unpacking: Vec<bool> = Vec::new();
    for position in start..index {
        let previous = position.checked_sub(1).filter(|p| *p >= start).map(|p| &tokens[p]);
        let at_target = previous.map_or(true, |t| {
            t.is_punct(",") || t.is_punct("(") || t.is_punct("[") || t.is_punct("*")
        });

        match &tokens[position] {
            Token::Punct("(" | "[") => unpacking.push(at_target),
            Token::Punct(")" | "]") => {
                unpacking.pop();
            }
            Token::Identifier(name) => {
                let next = tokens.get(position + 1);
                let is_accessed = next.is_some_and(|t| t.is_punct(".") || t.is_punct("[") || t.is_punct("("));
                let is_attribute = previous.is_some_and(|t| t.is_punct("."));
                // Annotation `name: Type`
                let is_annotation = previous.is_some_and(|t| t.is_punct(":"));

                if unpacking.iter().all(|u| *u) && !is_accessed && !is_attribute && !is_annotation {
                    declared.insert(name.clone());
                }
            }
            _ => {}
        }
    }
}

/// Declare the parameters of a `def` or `lambda` between `start` and `end`
fn declare_parameters(tokens: &[Token], start: usize, end: usize, declared: &mut HashSet<String>) {
    let mut depth = 0usize;
    for position in start..end.min(tokens.len()) {
        match &tokens[position] {
            Token::Punct("(" | "[" | "{") => depth += 1,
            Token::Punct(")" | "]" | "}") => depth = depth.saturating_sub(1),
            Token::Identifier(name) if depth <= 1 => {
                let previous = position.checked_sub(1).map(|p| &tokens[p]);
                if previous.is_some_and(|t| {
                    t.is_punct("(") || t.is_punct(",") || t.is_punct("*") || t.is_punct("**")
                }) || position == start
                {
                    declared.insert(name.clone());
                }
            }
            _ => {}
        }
    }
}

fn declared_names(tokens: &[Token]) -> HashSet<String> {
    let mut declared = HashSet::new();
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Punct("(" | "[" | "{") => depth += 1,
            Token::Punct(")" | "]" | "}") => depth = depth.saturating_sub(1),
            Token::Punct("=") if depth == 0 => {
                declare_assignment_targets(tokens, index, &mut declared)
            }
            Token::Punct(":=") => {
                if let Some(name) = index.checked_sub(1).and_then(|p| tokens[p].identifier()) {
                    declared.insert(name.to_string());
                }
            }
            Token::Identifier(word) => match word.as_str() {
                "def" | "class" => {
                    if let Some(name) = tokens.get(index + 1).and_then(Token::identifier) {
                        declared.insert(name.to_string());
                    }
                    if word == "def" && tokens.get(index + 2).is_some_and(|t| t.is_punct("(")) {
                        let close = matching_close(tokens, index + 2).unwrap_or(tokens.len());
                        declare_parameters(tokens, index + 2, close, &mut declared);
                    }
                }
                "lambda" => {
                    let colon = tokens[index..]
                        .iter()
                        .position(|t| t.is_punct(":"))
                        .map(|p| index + p)
                        .unwrap_or(tokens.len());
                    declare_parameters(tokens, index + 1, colon, &mut declared);
                }
                "for" => {
                    let end = tokens[index..]
                        .iter()
                        .position(|t| t.identifier() == Some("in"))
                        .map(|p| index + p)
                        .unwrap_or(index + 1);
                    for name in tokens[index + 1..end].iter().filter_map(Token::identifier) {
                        declared.insert(name.to_string());
                    }
                }
                "as" => {
                    if let Some(name) = tokens.get(index + 1).and_then(Token::identifier) {
                        declared.insert(name.to_string());
                    }
                }
                "import" => declare_imports(tokens, index + 1, &mut declared),
                // Module path of `from package.module import name`
                "from" => {
                    let path: Vec<&Token> = tokens[index + 1..]
                        .iter()
                        .take_while(|t| **t != Token::Newline && t.identifier() != Some("import"))
                        .collect();
                    let imports = tokens
                        .get(index + 1 + path.len())
                        .is_some_and(|t| t.identifier() == Some("import"));
                    if imports {
                        for name in path.into_iter().filter_map(Token::identifier) {
                            declared.insert(name.to_string());
                        }
                    }
                }
                _ => {}
            },
            _ => {}
        }
    }

    declared
}

/// Declare `import a.b, c` and `from m import a, b` names, `as` aliases are handled apart
fn declare_imports(tokens: &[Token], start: usize, declared: &mut HashSet<String>) {
    let mut expecting_name = true;
    for token in &tokens[start.min(tokens.len())..] {
        match token {
            Token::Newline | Token::Punct(";") => return,
            Token::Punct(",") => expecting_name = true,
            Token::Identifier(name) if expecting_name => {
                declared.insert(name.clone());
                expecting_name = false;
            }
            Token::Punct("(") => {}
            _ => expecting_name = false,
        }
    }
}

/// Names read by the script that it does not declare
pub(super) fn free_variables(script: &str, limits: &ScriptLimits) -> Result<BTreeSet<String>> {
    let tokens = Lexer::new(script, 0, limits).tokenize()?;
    check_identifier_limit(&tokens, limits)?;

    let declared = declared_names(&tokens);
    let mut free = BTreeSet::new();
    let mut depth = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        let name = match token {
            Token::Punct("(" | "[" | "{") => {
                depth += 1;
                continue;
            }
            Token::Punct(")" | "]" | "}") => {
                depth = depth.saturating_sub(1);
                continue;
            }
            Token::Identifier(name) => name.as_str(),
            _ => continue,
        };

        if KEYWORDS.contains(&name) || BUILTINS.contains(&name) || declared.contains(name) {
            continue;
        }

        let previous = index.checked_sub(1).map(|i| &tokens[i]);
        let next = tokens.get(index + 1);

        // Attribute access
        if previous.is_some_and(|t| t.is_punct(".")) {
            continue;
        }
        // Keyword argument `call(name=value)`
        if depth > 0 && next.is_some_and(|t| t.is_punct("=")) {
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
        free_variables(script, &ScriptLimits::default())
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn test_assignments_declare_names() {
        let script = "words = text.split()\ncount, rest = len(words), words[1:]\nreturn count + offset";
        assert_eq!(free(script), vec!["offset", "text"]);
    }

    #[test]
    fn test_functions_loops_and_imports() {
        let script = r#"
import json
from math import floor as round_down

def score(item, weight=default_weight):
    return round_down(item * weight)

results = [score(x) for x in items if x > threshold]
for index, value in enumerate(results):
    print(index, value, sep=separator)
return json.dumps(results)
"#;
        assert_eq!(free(script), vec!["default_weight", "items", "separator", "threshold"]);
    }

    #[test]
    fn test_subscript_assignment_reads_the_target() {
        assert_eq!(free("data[key] = value\nreturn data"), vec!["data", "key", "value"]);
        assert_eq!(free("obj.attr = 1\nreturn obj"), vec!["obj"]);
    }

    #[test]
    fn test_strings_and_comments() {
        let script = "# uses hidden\nlabel = 'name is {name}'\nreturn f\"{label}: {amount:.2f} {{literal}}\"";
        assert_eq!(free(script), vec!["amount"]);
    }

    #[test]
    fn test_compound_header_assignment() {
        assert_eq!(free("if ready: value = 1\nreturn value"), vec!["ready"]);
    }

    #[test]
    fn test_lambda_parameters() {
        assert_eq!(free("return sorted(items, key=lambda item: item[rank])"), vec!["items", "rank"]);
    }
}
