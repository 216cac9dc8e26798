//! Relevance Scoring
//!
//! `RelevanceScorer` is the field-weighted substring formula. The `Scorer` trait
//! is the seam the pipeline ranks through; two backends implement it:
//!
//! - **`SubstringScorer`**: scans the whole corpus in-process, fanning chunks out
//!   to blocking worker tasks.
//! - **`TextIndexScorer`**: hands the terms to the store's native text search and
//!   takes its scores as-is.

use super::error::SearchError;
use super::types::{ScoredResult, WeightedTerm};
use crate::store::DocumentStore;
use crate::store::types::NormalizedArticle;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub const TITLE_WEIGHT: f64 = 3.0;
pub const ABSTRACT_WEIGHT: f64 = 2.0;
/// Applied once per matching tag, uncapped.
pub const TAG_WEIGHT: f64 = 1.0;

/// Smallest slice of the corpus worth handing to its own worker.
const MIN_CHUNK_SIZE: usize = 256;

/// Scores are reported with four decimal places.
pub fn round_score(score: f64) -> f64 {
    (score * 10_000.0).round() / 10_000.0
}

/// Terms prepared once per search (lowercased, empty terms dropped) and then
/// applied to every document.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    terms: Vec<(String, f64)>,
}

impl RelevanceScorer {
    pub fn new(terms: &[WeightedTerm]) -> Self {
        Self {
            terms: terms
                .iter()
                .filter(|t| !t.term.is_empty())
                .map(|t| (t.term.to_lowercase(), t.weight))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// `3w` per title hit, `2w` per abstract hit, `1w` per matching tag.
    /// Matching is a case-insensitive substring test under Unicode lowercasing.
    pub fn score(&self, doc: &NormalizedArticle) -> f64 {
        let title = doc.title.to_lowercase();
        let abstract_text = doc.abstract_text.to_lowercase();
        let tags: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();

        let mut score = 0.0;
        for (term, weight) in &self.terms {
            if title.contains(term.as_str()) {
                score += TITLE_WEIGHT * weight;
            }
            if abstract_text.contains(term.as_str()) {
                score += ABSTRACT_WEIGHT * weight;
            }
            for tag in &tags {
                if tag.contains(term.as_str()) {
                    score += TAG_WEIGHT * weight;
                }
            }
        }
        round_score(score)
    }

    /// Scores a slice of the corpus, keeping positive scores in slice order.
    pub fn score_all(&self, docs: &[NormalizedArticle]) -> Vec<ScoredResult> {
        docs.iter()
            .filter_map(|doc| {
                let score = self.score(doc);
                (score > 0.0).then(|| ScoredResult {
                    id: doc.id.clone(),
                    score,
                })
            })
            .collect()
    }
}

/// Convenience wrapper for one-off scoring.
pub fn score(doc: &NormalizedArticle, terms: &[WeightedTerm]) -> f64 {
    RelevanceScorer::new(terms).score(doc)
}

pub type RankFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<ScoredResult>, SearchError>> + Send + 'a>>;

/// Produces the candidate set for a list of weighted terms.
///
/// Implementations return positive-score candidates in corpus order; ranking
/// (the stable sort) is applied by the pipeline once everything is collected.
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn rank<'a>(&'a self, terms: &'a [WeightedTerm]) -> RankFuture<'a>;
}

pub struct SubstringScorer {
    store: Arc<dyn DocumentStore>,
    workers: usize,
}

impl SubstringScorer {
    pub fn new(store: Arc<dyn DocumentStore>, workers: usize) -> Self {
        Self {
            store,
            workers: workers.max(1),
        }
    }
}

impl Scorer for SubstringScorer {
    fn name(&self) -> &'static str {
        "substring"
    }

    fn rank<'a>(&'a self, terms: &'a [WeightedTerm]) -> RankFuture<'a> {
        Box::pin(async move {
            let scorer = Arc::new(RelevanceScorer::new(terms));
            if scorer.is_empty() {
                return Ok(Vec::new());
            }

            let corpus = self.store.normalized_articles()?;
            let chunk_size = corpus.len().div_ceil(self.workers).max(MIN_CHUNK_SIZE);

            let mut handles = Vec::new();
            let mut start = 0;
            while start < corpus.len() {
                let end = (start + chunk_size).min(corpus.len());
                let corpus = corpus.clone();
                let scorer = scorer.clone();
                handles.push(tokio::task::spawn_blocking(move || {
                    scorer.score_all(&corpus[start..end])
                }));
                start = end;
            }

            tracing::debug!(
                "Scoring {} documents across {} chunks",
                corpus.len(),
                handles.len()
            );

            // Awaited in spawn order so candidates stay in corpus order.
            let mut candidates = Vec::new();
            for handle in handles {
                let scored = handle
                    .await
                    .map_err(|e| SearchError::Internal(format!("scoring worker failed: {}", e)))?;
                candidates.extend(scored);
            }
            Ok(candidates)
        })
    }
}

pub struct TextIndexScorer {
    store: Arc<dyn DocumentStore>,
}

impl TextIndexScorer {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

impl Scorer for TextIndexScorer {
    fn name(&self) -> &'static str {
        "text-index"
    }

    fn rank<'a>(&'a self, terms: &'a [WeightedTerm]) -> RankFuture<'a> {
        Box::pin(async move {
            if terms.is_empty() {
                return Ok(Vec::new());
            }
            let store = self.store.clone();
            let terms = terms.to_vec();
            tokio::task::spawn_blocking(move || store.text_search(&terms))
                .await
                .map_err(|e| SearchError::Internal(format!("text search failed: {}", e)))?
                .map_err(SearchError::from)
        })
    }
}
