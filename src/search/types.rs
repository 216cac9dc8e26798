use crate::store::types::{Article, ArticleId};
use serde::{Deserialize, Serialize};

/// Weight carried by the user's own query term.
pub const ORIGINAL_TERM_WEIGHT: f64 = 1.0;

/// A query term together with its contribution factor to the relevance score.
///
/// This is the single internal representation of a term: the raw query, every
/// synonym injected by expansion and every lemmatized form all travel as
/// `WeightedTerm`s. A weight of `0.0` is legal and turns the term into a no-op.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeightedTerm {
    pub term: String,
    pub weight: f64,
}

impl WeightedTerm {
    pub fn new(term: impl Into<String>, weight: f64) -> Self {
        Self {
            term: term.into(),
            weight,
        }
    }

    /// The unexpanded query at full strength.
    pub fn original(query: &str) -> Self {
        Self::new(query, ORIGINAL_TERM_WEIGHT)
    }
}

/// Relevance of one document, before hydration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredResult {
    pub id: ArticleId,
    pub score: f64,
}

/// A hydrated article with its score attached.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredArticle {
    #[serde(flatten)]
    pub article: Article,
    pub score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub expanded_terms: Vec<WeightedTerm>,
    pub normalized_terms: Vec<String>,
    pub results: Vec<ScoredArticle>,
    /// Wall-clock seconds spent on the whole search.
    pub duration: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
