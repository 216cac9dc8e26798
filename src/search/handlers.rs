use super::engine::SearchPipeline;
use super::error::SearchError;
use super::types::SearchResponse;
use crate::error::ApiError;

use axum::extract::Query;
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
    pub expand: Option<String>,
    pub lemmas: Option<String>,
}

pub async fn handle_search(
    Query(params): Query<SearchParams>,
    Extension(pipeline): Extension<Arc<SearchPipeline>>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = params.q.unwrap_or_default();
    let expand = parse_flag(params.expand.as_deref(), false);
    let use_lemmas = parse_flag(params.lemmas.as_deref(), true);

    match pipeline.search(&query, expand, use_lemmas).await {
        Ok(response) => {
            tracing::info!(
                "Search '{}' (expand={}, lemmas={}) -> {} results in {:.3}s",
                response.query,
                expand,
                use_lemmas,
                response.results.len(),
                response.duration
            );
            Ok(Json(response))
        }
        Err(SearchError::MissingQuery) => Err(SearchError::MissingQuery.into()),
        Err(e) => {
            tracing::error!("Search '{}' failed: {}", query, e);
            Err(e.into())
        }
    }
}

/// Query-string boolean: `1/true/on/yes` are true, any other present value is
/// false, and an absent flag takes `default`.
pub fn parse_flag(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
    }
}
