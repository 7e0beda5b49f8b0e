//! Text transformations applied to a book before it is sectionized

use super::{FenceLine, FenceTracker};
use promptbook_core::constants::DEFAULT_BOOK_TITLE;
use regex::Regex;
use std::sync::LazyLock;

static BACKTICKED_PARAMETER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`\{([A-Za-z0-9_]+)\}`").expect("valid regex"));

static BACKTICKED_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`->\s*\{([A-Za-z0-9_]+)\}`").expect("valid regex"));

static RETURN_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^->\s*\{[A-Za-z0-9_]+\}\s*$").expect("valid regex"));

/// Apply `transform` to every line outside fenced code blocks
fn map_lines_outside_fences(markdown: &str, mut transform: impl FnMut(&str) -> Option<String>) -> String {
    let mut fences = FenceTracker::new();
    let mut output: Vec<String> = Vec::new();

    for line in markdown.lines() {
        if fences.classify(line) != FenceLine::Outside {
            output.push(line.to_string());
        } else if let Some(line) = transform(line) {
            output.push(line);
        }
    }

    output.join("\n")
}

/// Remove `<!-- ... -->` comments outside fenced code blocks
///
/// Comments may span several lines. Lines that contained nothing but a
/// comment are dropped.
pub fn remove_markdown_comments(markdown: &str) -> String {
    let mut in_comment = false;

    map_lines_outside_fences(markdown, |line| {
        if !in_comment && !line.contains("<!--") {
            return Some(line.to_string());
        }

        let mut kept = String::new();
        let mut rest = line;
        loop {
            if in_comment {
                match rest.find("-->") {
                    Some(end) => {
                        rest = &rest[end + 3..];
                        in_comment = false;
                    }
                    None => break,
                }
            } else {
                match rest.find("<!--") {
                    Some(start) => {
                        kept.push_str(&rest[..start]);
                        rest = &rest[start + 4..];
                        in_comment = true;
                    }
                    None => {
                        kept.push_str(rest);
                        break;
                    }
                }
            }
        }

        if kept.trim().is_empty() {
            None
        } else {
            Some(kept.trim_end().to_string())
        }
    })
}

/// Turn `` `{name}` `` into `{name}` and `` `-> {name}` `` into `-> {name}`
pub fn unwrap_backticked_parameters(markdown: &str) -> String {
    map_lines_outside_fences(markdown, |line| {
        let line = BACKTICKED_RETURN.replace_all(line, "-> {$1}");
        let line = BACKTICKED_PARAMETER.replace_all(&line, "{$1}");
        Some(line.into_owned())
    })
}

/// Check whether the book is a bare prompt followed by a return statement
pub fn is_flat_book(markdown: &str) -> bool {
    let trimmed = markdown.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }

    let mut fences = FenceTracker::new();
    for line in trimmed.lines() {
        if fences.classify(line) == FenceLine::Outside
            && super::sections::heading_level(line).is_some()
        {
            return false;
        }
    }

    trimmed
        .lines()
        .last()
        .is_some_and(|last| RETURN_LINE.is_match(last.trim()))
}

/// Wrap a flat book into a pipeline with a single prompt section
pub fn wrap_flat_book(markdown: &str) -> String {
    if !is_flat_book(markdown) {
        return markdown.to_string();
    }

    let mut lines: Vec<&str> = markdown.trim().lines().collect();
    let return_line = lines.pop().unwrap_or_default().trim();
    let prompt = lines.join("\n").trim().to_string();

    let quoted = if prompt.lines().count() <= 1 {
        format!("> {}", prompt)
    } else {
        format!("```\n{}\n```", prompt)
    };

    format!(
        "# {}\n\n## Prompt\n\n{}\n\n{}",
        DEFAULT_BOOK_TITLE, quoted, return_line
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remove_single_line_comment() {
        let markdown = "# Title\n<!-- hidden -->\nVisible <!-- inline --> text";
        assert_eq!(remove_markdown_comments(markdown), "# Title\nVisible  text");
    }

    #[test]
    fn test_remove_multiline_comment() {
        let markdown = "A\n<!--\n## Not a section\n-->\nB";
        assert_eq!(remove_markdown_comments(markdown), "A\nB");
    }

    #[test]
    fn test_comments_inside_fences_are_kept() {
        let markdown = "```html\n<!-- keep -->\n```";
        assert_eq!(remove_markdown_comments(markdown), markdown);
    }

    #[test]
    fn test_unwrap_backticked_parameters() {
        let markdown = "Write about `{topic}`\n\n`-> {poem}`";
        assert_eq!(
            unwrap_backticked_parameters(markdown),
            "Write about {topic}\n\n-> {poem}"
        );
    }

    #[test]
    fn test_flat_book_wrapping() {
        let flat = "Tell me a joke about {topic}\n-> {joke}";
        assert!(is_flat_book(flat));
        assert_eq!(
            wrap_flat_book(flat),
            "# Untitled\n\n## Prompt\n\n> Tell me a joke about {topic}\n\n-> {joke}"
        );

        let multiline = "Line one\nLine two\n-> {out}";
        assert!(wrap_flat_book(multiline).contains("```\nLine one\nLine two\n```"));
    }

    #[test]
    fn test_structured_book_is_not_flat() {
        assert!(!is_flat_book("# Title\n\nHello\n-> {x}"));
        assert!(!is_flat_book("Intro\n\n## Section\n\n-> {x}"));
        assert!(!is_flat_book("Just a prompt without a result"));
    }
}
