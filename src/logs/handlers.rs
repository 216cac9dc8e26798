use super::sink::SearchLogSink;
use super::summary::{summarize, summarize_per_query};
use super::types::{LogSummary, QuerySummaryResponse, SearchLogsResponse};
use crate::error::ApiError;

use axum::extract::Query;
use axum::{Extension, Json};
use serde::Deserialize;
use std::sync::Arc;

pub const DEFAULT_LOG_LIMIT: usize = 100;
/// Records considered by the per-query summary.
const PER_QUERY_WINDOW: usize = 100;
/// Distinct queries reported by the per-query summary.
const PER_QUERY_MAX_QUERIES: usize = 10;

#[derive(Deserialize)]
pub struct LogsParams {
    pub limit: Option<usize>,
}

pub async fn handle_search_logs(
    Query(params): Query<LogsParams>,
    Extension(sink): Extension<Arc<dyn SearchLogSink>>,
) -> Result<Json<SearchLogsResponse>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    let logs = sink.recent(limit).await.map_err(|e| {
        tracing::error!("Failed to read search logs: {:#}", e);
        ApiError::internal("Failed to read search logs", format!("{:#}", e))
    })?;

    Ok(Json(SearchLogsResponse {
        status: "success".to_string(),
        logs,
    }))
}

pub async fn handle_logs_summary(
    Extension(sink): Extension<Arc<dyn SearchLogSink>>,
) -> Result<Json<LogSummary>, ApiError> {
    let logs = sink.recent(usize::MAX).await.map_err(|e| {
        tracing::error!("Failed to read search logs: {:#}", e);
        ApiError::internal("Failed to read search logs", format!("{:#}", e))
    })?;

    Ok(Json(summarize(&logs)))
}

pub async fn handle_logs_summary_per_query(
    Extension(sink): Extension<Arc<dyn SearchLogSink>>,
) -> Result<Json<QuerySummaryResponse>, ApiError> {
    let logs = sink.recent(PER_QUERY_WINDOW).await.map_err(|e| {
        tracing::error!("Failed to read search logs: {:#}", e);
        ApiError::internal("Failed to read search logs", format!("{:#}", e))
    })?;

    Ok(Json(QuerySummaryResponse {
        status: "success".to_string(),
        queries: summarize_per_query(&logs, PER_QUERY_MAX_QUERIES),
    }))
}
