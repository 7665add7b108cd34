//! JSON utility functions shared across crates.
//!
//! Model replies are free-form text that may end in a JSON object. These helpers
//! mark the boundary between the text reply and the structured payload.

use std::sync::LazyLock;

use regex::Regex;

#[expect(clippy::unwrap_used, reason = "static regex pattern")]
static TRAILING_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}\z").unwrap());

#[expect(clippy::unwrap_used, reason = "static regex pattern")]
static ANY_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Strip markdown code block wrappers from JSON content.
///
/// Handles `` ```json ... ``` ``, `` ``` ... ``` ``, and other language identifiers.
#[must_use]
pub fn strip_markdown_json(content: &str) -> &str {
    let trimmed = content.trim();
    if trimmed.starts_with("```") && trimmed.ends_with("```") {
        let without_prefix = trimmed.strip_prefix("```").unwrap_or(trimmed);
        let without_suffix = without_prefix.strip_suffix("```").unwrap_or(without_prefix);
        return without_suffix
            .split_once('\n')
            .map_or_else(|| without_suffix.trim(), |(_, rest)| rest.trim());
    }
    trimmed
}

/// Locates a `{...}` block anchored at the end of a model reply.
///
/// Trailing whitespace and a closing code fence are ignored. Among the
/// candidate start positions, the leftmost one that parses as a JSON object
/// wins; when none parses, the leftmost candidate is returned anyway so the
/// caller can surface the parse error.
#[must_use]
pub fn extract_trailing_json(reply: &str) -> Option<&str> {
    let mut text = reply.trim_end();
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.trim_end();
    }
    let leftmost = TRAILING_OBJECT.find(text)?;
    let tail = &text[leftmost.start()..];
    let parsed = tail
        .char_indices()
        .filter(|(_, c)| *c == '{')
        .map(|(i, _)| &tail[i..])
        .find(|candidate| is_json_object(candidate));
    Some(parsed.unwrap_or(leftmost.as_str()))
}

/// Returns the span from the first `{` to the last `}` anywhere in `text`.
#[must_use]
pub fn extract_first_json(text: &str) -> Option<&str> {
    ANY_OBJECT.find(text).map(|m| m.as_str())
}

fn is_json_object(candidate: &str) -> bool {
    matches!(serde_json::from_str::<serde_json::Value>(candidate), Ok(serde_json::Value::Object(_)))
}
