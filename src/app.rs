//! Service wiring: builds the shared components from a `Config` and mounts the
//! HTTP routes over them.

use crate::config::{Config, ScorerKind};
use crate::lemmatizer::Lemmatizer;
use crate::lemmatizer::command::CommandLemmatizer;
use crate::lemmatizer::http::HttpLemmatizer;
use crate::lemmatizer::normalizer::TermNormalizer;
use crate::logs::handlers::{
    handle_logs_summary, handle_logs_summary_per_query, handle_search_logs,
};
use crate::logs::sink::{FileSearchLog, MemorySearchLog, SearchLogSink};
use crate::search::engine::SearchPipeline;
use crate::search::handlers::handle_search;
use crate::search::scorer::{Scorer, SubstringScorer, TextIndexScorer};
use crate::store::DocumentStore;
use crate::store::handlers::handle_get_article;
use crate::store::memory::MemoryStore;
use crate::synonyms::dictionary::SynonymDictionary;
use crate::synonyms::expander::QueryExpander;
use crate::synonyms::handlers::{handle_get_synonyms, handle_update_synonyms};

use anyhow::Context;
use axum::routing::{get, put};
use axum::{Extension, Json, Router};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppContext {
    pub pipeline: Arc<SearchPipeline>,
    pub store: Arc<dyn DocumentStore>,
    pub dictionary: Arc<SynonymDictionary>,
    pub search_log: Arc<dyn SearchLogSink>,
}

impl AppContext {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = MemoryStore::load(
            config.articles_path.as_deref(),
            config.normalized_path.as_deref(),
        )
        .await
        .context("Failed to load document store")?;
        let store: Arc<dyn DocumentStore> = Arc::new(store);

        let dictionary = Arc::new(SynonymDictionary::open(&config.synonyms_path));
        tracing::info!(
            "Synonym dictionary {} ({} entries)",
            config.synonyms_path.display(),
            dictionary.len()
        );

        let normalizer = match build_lemmatizer(config) {
            Some(lemmatizer) => {
                tracing::info!("Lemmatizer: {}", lemmatizer.name());
                TermNormalizer::new(lemmatizer)
            }
            None => {
                tracing::info!("Lemmatization disabled, terms pass through");
                TermNormalizer::disabled()
            }
        };

        let search_log: Arc<dyn SearchLogSink> = match &config.search_log_path {
            Some(path) => {
                tracing::info!("Search log: {}", path.display());
                Arc::new(FileSearchLog::new(path))
            }
            None => Arc::new(MemorySearchLog::new()),
        };

        Ok(Self::new(
            store,
            dictionary,
            normalizer,
            config.scorer,
            search_log,
            config.workers,
            config.search_timeout,
        ))
    }

    pub fn new(
        store: Arc<dyn DocumentStore>,
        dictionary: Arc<SynonymDictionary>,
        normalizer: TermNormalizer,
        scorer: ScorerKind,
        search_log: Arc<dyn SearchLogSink>,
        workers: usize,
        timeout: Duration,
    ) -> Self {
        let scorer: Arc<dyn Scorer> = match scorer {
            ScorerKind::Substring => Arc::new(SubstringScorer::new(store.clone(), workers)),
            ScorerKind::TextIndex => Arc::new(TextIndexScorer::new(store.clone())),
        };

        let pipeline = SearchPipeline::new(
            QueryExpander::new(dictionary.clone()),
            normalizer,
            scorer,
            store.clone(),
            search_log.clone(),
        )
        .with_timeout(timeout);
        tracing::info!(
            "Search pipeline ready (scorer={}, timeout={:?})",
            pipeline.scorer_name(),
            timeout
        );

        Self {
            pipeline: Arc::new(pipeline),
            store,
            dictionary,
            search_log,
        }
    }
}

/// The HTTP lemmatizer wins over the command when both are configured.
fn build_lemmatizer(config: &Config) -> Option<Arc<dyn Lemmatizer>> {
    if !config.lemmas_enabled {
        return None;
    }
    if let Some(url) = &config.lemmatizer_url {
        return Some(Arc::new(HttpLemmatizer::new(
            url.clone(),
            config.lemmatizer_timeout,
        )));
    }
    let line = config.lemmatizer_cmd.as_deref()?;
    let command = CommandLemmatizer::from_command_line(line, config.lemmatizer_timeout)?;
    Some(Arc::new(command))
}

async fn handle_ping() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/search", get(handle_search))
        .route("/article/:id", get(handle_get_article))
        .route("/synonyms", get(handle_get_synonyms))
        .route("/synonyms/:term", put(handle_update_synonyms))
        .route("/search-logs", get(handle_search_logs))
        .route("/search-logs/summary", get(handle_logs_summary))
        .route(
            "/search-logs/summary-per-query",
            get(handle_logs_summary_per_query),
        )
        .route("/ping", get(handle_ping))
        .layer(Extension(ctx.pipeline))
        .layer(Extension(ctx.store))
        .layer(Extension(ctx.dictionary))
        .layer(Extension(ctx.search_log))
}
