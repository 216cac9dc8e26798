//! Lemmatization Module
//!
//! Lemmatization is an external capability: the service never reduces words
//! itself, it asks an out-of-process tool and treats anything other than a
//! clean, complete answer as a failure.
//!
//! ## Submodules
//! - **`command`**: runs a local program per request (`python normalize_query.py ...`).
//! - **`http`**: calls a lemmatization service over HTTP, with retries.
//! - **`normalizer`**: `TermNormalizer`, which keeps lemmas index-aligned with
//!   the terms they came from and degrades to an empty list on failure.

pub mod command;
pub mod http;
pub mod normalizer;


use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum LemmatizerError {
    #[error("failed to start lemmatizer: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("lemmatizer exited with {status}: {stderr}")]
    Exit { status: String, stderr: String },
    #[error("lemmatizer produced no output")]
    EmptyOutput,
    #[error("lemmatizer returned invalid output: {0}")]
    InvalidOutput(String),
    #[error("lemmatizer timed out after {0:?}")]
    Timeout(Duration),
    #[error("lemmatizer request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("lemmatizer responded with status {0}")]
    Status(u16),
}

pub type LemmaFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<String>, LemmatizerError>> + Send + 'a>>;

/// Reduces whitespace-free words to their base forms, one lemma per word.
pub trait Lemmatizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn lemmatize<'a>(&'a self, words: &'a [String]) -> LemmaFuture<'a>;
}

/// Parses the lemmatizer wire format: a JSON array of strings.
pub fn parse_lemmas(output: &str) -> Result<Vec<String>, LemmatizerError> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(LemmatizerError::EmptyOutput);
    }
    serde_json::from_str::<Vec<String>>(trimmed)
        .map_err(|e| LemmatizerError::InvalidOutput(format!("{}: {}", e, truncate(trimmed, 200))))
}

fn truncate(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
