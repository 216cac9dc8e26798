use regex::Regex;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s\-_]+").expect("valid separator pattern"));

/// Dictionary lookup key: lowercase with every whitespace, hyphen and underscore
/// removed, so "multi-agent systems", "MultiAgent_Systems" and
/// "multi agent systems" all land on the same entry. Idempotent.
pub fn normalize_key(raw: &str) -> String {
    SEPARATORS.replace_all(&raw.to_lowercase(), "").into_owned()
}
