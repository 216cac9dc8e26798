use super::DocumentStore;
use super::types::{Article, ArticleId};
use crate::error::ApiError;

use axum::extract::Path;
use axum::{Extension, Json};
use std::sync::Arc;

pub async fn handle_get_article(
    Extension(store): Extension<Arc<dyn DocumentStore>>,
    Path(id_str): Path<String>,
) -> Result<Json<Article>, ApiError> {
    let id: ArticleId = match id_str.parse() {
        Ok(id) => id,
        Err(e) => {
            tracing::debug!("Rejected article lookup: {}", e);
            return Err(ApiError::BadRequest("Invalid article id".to_string()));
        }
    };

    match store.article(&id) {
        Ok(Some(article)) => Ok(Json(article)),
        Ok(None) => Err(ApiError::NotFound("Article not found".to_string())),
        Err(e) => {
            tracing::error!("Failed to fetch article {}: {}", id, e);
            Err(ApiError::internal("Failed to fetch article", e))
        }
    }
}
