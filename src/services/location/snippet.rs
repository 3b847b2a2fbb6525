//! Inspection sentence isolation.

use std::sync::LazyLock;

use regex::Regex;

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern should compile"));

static INSPECTED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\binspected\b").expect("inspected pattern should compile")
});

static LEADING_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s,;:-]+").expect("punctuation pattern should compile"));

static LEADING_PREPOSITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:at|in|on|near|inside|outside)\b[\s,:-]*")
        .expect("preposition pattern should compile")
});

/// Collapse every whitespace run to a single space.
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").into_owned()
}

/// Text following the first whole-word "inspected", up to the next period,
/// with leading punctuation and one leading preposition removed.
///
/// `None` when the word does not occur. The result may be empty.
pub fn inspection_snippet(text: &str) -> Option<String> {
    let text = normalize_whitespace(text);
    let found = INSPECTED.find(&text)?;

    let rest = &text[found.end()..];
    let sentence = match rest.find('.') {
        Some(end) => &rest[..end],
        None => rest,
    };

    let cleaned = LEADING_PUNCTUATION.replace(sentence.trim(), "");
    let cleaned = LEADING_PREPOSITION.replace(&cleaned, "");
    Some(cleaned.into_owned())
}
