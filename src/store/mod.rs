//! Document Store Module
//!
//! The corpus the search pipeline runs over. The pipeline only ever talks to the
//! `DocumentStore` trait; `MemoryStore` is the bundled implementation, loaded from
//! JSON exports at startup.
//!
//! ## Collections
//! - **Articles**: full records, looked up by id during hydration.
//! - **Normalized articles**: lemmatized `title`/`abstract`/`tags`, scanned in
//!   insertion order during scoring.

pub mod handlers;
pub mod memory;
pub mod types;


use crate::search::types::{ScoredResult, WeightedTerm};
use std::sync::Arc;
use types::{Article, ArticleId, NormalizedArticle};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed collection {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub trait DocumentStore: Send + Sync {
    /// Full scan over normalized articles, in stable insertion order.
    fn normalized_articles(&self) -> Result<Arc<Vec<NormalizedArticle>>, StoreError>;

    /// Point lookup of full records. Unknown ids are skipped; no ordering guarantee.
    fn articles_by_ids(&self, ids: &[ArticleId]) -> Result<Vec<Article>, StoreError>;

    fn article(&self, id: &ArticleId) -> Result<Option<Article>, StoreError>;

    /// Native word-level text search with store-side relevance. Only documents
    /// with a positive score are returned, in corpus order.
    fn text_search(&self, terms: &[WeightedTerm]) -> Result<Vec<ScoredResult>, StoreError>;
}
