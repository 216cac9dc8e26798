use super::error::SearchError;
use super::scorer::Scorer;
use super::types::{ScoredArticle, ScoredResult, SearchResponse, WeightedTerm};
use crate::lemmatizer::normalizer::TermNormalizer;
use crate::logs::sink::SearchLogSink;
use crate::logs::types::SearchLogRecord;
use crate::store::DocumentStore;
use crate::store::types::{Article, ArticleId};
use crate::synonyms::expander::QueryExpander;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const NOTHING_FOUND: &str = "Nothing found for this query.";
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_LOG_WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// expand -> normalize -> score -> rank -> hydrate.
///
/// Holds no per-request state; one instance serves every request concurrently.
pub struct SearchPipeline {
    expander: QueryExpander,
    normalizer: TermNormalizer,
    scorer: Arc<dyn Scorer>,
    store: Arc<dyn DocumentStore>,
    search_log: Arc<dyn SearchLogSink>,
    timeout: Duration,
    log_timeout: Duration,
}

impl SearchPipeline {
    pub fn new(
        expander: QueryExpander,
        normalizer: TermNormalizer,
        scorer: Arc<dyn Scorer>,
        store: Arc<dyn DocumentStore>,
        search_log: Arc<dyn SearchLogSink>,
    ) -> Self {
        Self {
            expander,
            normalizer,
            scorer,
            store,
            search_log,
            timeout: DEFAULT_SEARCH_TIMEOUT,
            log_timeout: DEFAULT_LOG_WRITE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Bounds the search-log write that follows each successful search.
    pub fn with_log_timeout(mut self, timeout: Duration) -> Self {
        self.log_timeout = timeout;
        self
    }

    pub fn scorer_name(&self) -> &'static str {
        self.scorer.name()
    }

    /// Runs one search end to end and records it in the search log.
    ///
    /// A blank query is rejected before any work happens. Store faults, worker
    /// failures and timeouts abort the request as a whole; nothing partially
    /// scored or hydrated is returned.
    pub async fn search(
        &self,
        query: &str,
        expand: bool,
        use_lemmas: bool,
    ) -> Result<SearchResponse, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::MissingQuery);
        }

        let started = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.run(query, expand, use_lemmas, started))
            .await
            .map_err(|_| SearchError::Timeout(self.timeout))??;

        self.record(&response, expand, use_lemmas).await;
        Ok(response)
    }

    async fn run(
        &self,
        query: &str,
        expand: bool,
        use_lemmas: bool,
        started: Instant,
    ) -> Result<SearchResponse, SearchError> {
        let expanded_terms = if expand {
            self.expander.expand_with_weights(query)
        } else {
            vec![WeightedTerm::original(query)]
        };

        let raw_terms: Vec<String> = expanded_terms.iter().map(|t| t.term.clone()).collect();
        let normalized_terms = if use_lemmas {
            self.normalizer.normalize(&raw_terms).await
        } else {
            raw_terms
        };

        let terms = pair_weights(&expanded_terms, &normalized_terms);
        tracing::debug!(
            "Query '{}': {} expanded, {} usable terms",
            query,
            expanded_terms.len(),
            terms.len()
        );

        let candidates = rank_candidates(self.scorer.rank(&terms).await?);

        if candidates.is_empty() {
            tracing::info!("No relevant articles for query '{}'", query);
            return Ok(SearchResponse {
                query: query.to_string(),
                expanded_terms,
                normalized_terms,
                results: Vec::new(),
                duration: started.elapsed().as_secs_f64(),
                message: Some(NOTHING_FOUND.to_string()),
            });
        }

        let results = self.hydrate(&candidates)?;

        Ok(SearchResponse {
            query: query.to_string(),
            expanded_terms,
            normalized_terms,
            results,
            duration: started.elapsed().as_secs_f64(),
            message: None,
        })
    }

    /// Fetches full records for the ranked candidates and attaches their scores.
    /// Candidates whose record is missing from the store are dropped.
    fn hydrate(&self, candidates: &[ScoredResult]) -> Result<Vec<ScoredArticle>, SearchError> {
        let ids: Vec<ArticleId> = candidates.iter().map(|c| c.id.clone()).collect();
        let mut by_id: HashMap<ArticleId, Article> = self
            .store
            .articles_by_ids(&ids)?
            .into_iter()
            .map(|article| (article.id.clone(), article))
            .collect();

        let mut results: Vec<ScoredArticle> = candidates
            .iter()
            .filter_map(|candidate| match by_id.remove(&candidate.id) {
                Some(article) => Some(ScoredArticle {
                    article,
                    score: candidate.score,
                }),
                None => {
                    tracing::debug!("Candidate {} has no article record", candidate.id);
                    None
                }
            })
            .collect();

        // Hydration keeps scores verbatim, so this re-sort leaves the ranking as is.
        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(results)
    }

    async fn record(&self, response: &SearchResponse, expand: bool, use_lemmas: bool) {
        let record = SearchLogRecord::new(
            &response.query,
            expand,
            use_lemmas,
            response.expanded_terms.clone(),
            response.normalized_terms.clone(),
            response.results.len(),
            response.duration,
        );

        match tokio::time::timeout(self.log_timeout, self.search_log.record(record)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!("Failed to write search log: {:#}", e),
            Err(_) => tracing::warn!(
                "Search log write for '{}' exceeded {:?}, dropped",
                response.query,
                self.log_timeout
            ),
        }
    }
}

/// Re-attaches weights to normalized terms by position.
///
/// Empty positions are dropped. If the normalizer did not answer with one entry
/// per term, positions cannot be trusted and every term is dropped.
pub fn pair_weights(expanded: &[WeightedTerm], normalized: &[String]) -> Vec<WeightedTerm> {
    if normalized.len() != expanded.len() {
        if !normalized.is_empty() {
            tracing::warn!(
                "Normalized {} terms into {} entries, discarding",
                expanded.len(),
                normalized.len()
            );
        }
        return Vec::new();
    }

    expanded
        .iter()
        .zip(normalized)
        .filter(|(_, term)| !term.is_empty())
        .map(|(original, term)| WeightedTerm::new(term.clone(), original.weight))
        .collect()
}

/// Drops zero scores and sorts by score, highest first. The sort is stable, so
/// equal scores keep corpus order.
pub fn rank_candidates(mut candidates: Vec<ScoredResult>) -> Vec<ScoredResult> {
    candidates.retain(|c| c.score > 0.0);
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
    candidates
}
