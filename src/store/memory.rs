use super::types::{Article, ArticleId, NormalizedArticle};
use super::{DocumentStore, StoreError};
use crate::search::scorer::{ABSTRACT_WEIGHT, TAG_WEIGHT, TITLE_WEIGHT, round_score};
use crate::search::tokenizer::{tokenize_query, tokenize_text};
use crate::search::types::{ScoredResult, WeightedTerm};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// In-process document store.
///
/// Full articles sit in a `DashMap` keyed by id (hydration is a point lookup);
/// normalized articles are kept in a `Vec` so the scoring scan always sees
/// the same order.
pub struct MemoryStore {
    articles: DashMap<ArticleId, Article>,
    normalized: Arc<Vec<NormalizedArticle>>,
}

impl MemoryStore {
    pub fn new(articles: Vec<Article>, normalized: Vec<NormalizedArticle>) -> Self {
        let map = DashMap::new();
        for article in articles {
            if map.contains_key(&article.id) {
                tracing::warn!("Duplicate article id {}, keeping first", article.id);
                continue;
            }
            map.insert(article.id.clone(), article);
        }

        let mut seen = HashSet::new();
        let normalized = normalized
            .into_iter()
            .filter(|doc| {
                let fresh = seen.insert(doc.id.clone());
                if !fresh {
                    tracing::warn!("Duplicate normalized article id {}, keeping first", doc.id);
                }
                fresh
            })
            .collect();

        Self {
            articles: map,
            normalized: Arc::new(normalized),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    /// Loads both collections from JSON array files. A missing path means an
    /// empty collection; an unreadable or non-array file is an error.
    pub async fn load(
        articles_path: Option<&Path>,
        normalized_path: Option<&Path>,
    ) -> Result<Self, StoreError> {
        let articles: Vec<Article> = match articles_path {
            Some(path) => read_collection(path).await?,
            None => Vec::new(),
        };
        let normalized: Vec<NormalizedArticle> = match normalized_path {
            Some(path) => read_collection(path).await?,
            None => Vec::new(),
        };

        tracing::info!(
            "Loaded {} articles and {} normalized articles",
            articles.len(),
            normalized.len()
        );

        Ok(Self::new(articles, normalized))
    }

    pub fn article_count(&self) -> usize {
        self.articles.len()
    }

    pub fn normalized_count(&self) -> usize {
        self.normalized.len()
    }
}

/// Reads a JSON array, skipping (and logging) records that fail to parse, e.g.
/// ones without a usable id.
async fn read_collection<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    let shown = path.display().to_string();
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Io {
            path: shown.clone(),
            source,
        })?;

    let records: Vec<serde_json::Value> =
        serde_json::from_str(&text).map_err(|source| StoreError::Malformed {
            path: shown.clone(),
            source,
        })?;

    let mut parsed = Vec::with_capacity(records.len());
    for (position, record) in records.into_iter().enumerate() {
        match serde_json::from_value(record) {
            Ok(item) => parsed.push(item),
            Err(e) => tracing::warn!("Skipping record {} in {}: {}", position, shown, e),
        }
    }
    Ok(parsed)
}

fn covers(field: &HashSet<String>, tokens: &[String]) -> bool {
    tokens.iter().all(|token| field.contains(token))
}

impl DocumentStore for MemoryStore {
    fn normalized_articles(&self) -> Result<Arc<Vec<NormalizedArticle>>, StoreError> {
        Ok(self.normalized.clone())
    }

    fn articles_by_ids(&self, ids: &[ArticleId]) -> Result<Vec<Article>, StoreError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.articles.get(id).map(|entry| entry.value().clone()))
            .collect())
    }

    fn article(&self, id: &ArticleId) -> Result<Option<Article>, StoreError> {
        Ok(self.articles.get(id).map(|entry| entry.value().clone()))
    }

    // A term matches a field when every one of its words occurs there as a
    // whole word. Field weights mirror the substring scorer.
    fn text_search(&self, terms: &[WeightedTerm]) -> Result<Vec<ScoredResult>, StoreError> {
        let queries: Vec<(Vec<String>, f64)> = terms
            .iter()
            .map(|t| (tokenize_query(&t.term), t.weight))
            .filter(|(tokens, _)| !tokens.is_empty())
            .collect();

        if queries.is_empty() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for doc in self.normalized.iter() {
            let title = tokenize_text(&doc.title);
            let abstract_words = tokenize_text(&doc.abstract_text);
            let tags: Vec<HashSet<String>> = doc.tags.iter().map(|t| tokenize_text(t)).collect();

            let mut score = 0.0;
            for (tokens, weight) in &queries {
                if covers(&title, tokens) {
                    score += TITLE_WEIGHT * weight;
                }
                if covers(&abstract_words, tokens) {
                    score += ABSTRACT_WEIGHT * weight;
                }
                for tag in &tags {
                    if covers(tag, tokens) {
                        score += TAG_WEIGHT * weight;
                    }
                }
            }

            let score = round_score(score);
            if score > 0.0 {
                results.push(ScoredResult {
                    id: doc.id.clone(),
                    score,
                });
            }
        }
        Ok(results)
    }
}
