use crate::store::StoreError;
use std::time::Duration;

/// Failures that end a search request.
///
/// Degraded paths (broken synonym dictionary, failing lemmatizer, failing search
/// log) are not represented here: they are absorbed inside the pipeline.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("Missing query")]
    MissingQuery,
    #[error("document store failure: {0}")]
    Store(#[from] StoreError),
    #[error("search timed out after {0:?}")]
    Timeout(Duration),
    #[error("internal fault: {0}")]
    Internal(String),
}
