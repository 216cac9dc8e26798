use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

// Unicode-aware: \w covers Cyrillic, Greek, CJK, etc.
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word pattern"));

/// Distinct lowercase words of a document field.
pub fn tokenize_text(text: &str) -> HashSet<String> {
    WORD.find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Lowercase words of a query term, in order, duplicates kept.
pub fn tokenize_query(query: &str) -> Vec<String> {
    WORD.find_iter(&query.to_lowercase())
        .map(|m| m.as_str().to_string())
        .collect()
}
