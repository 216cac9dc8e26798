use super::dictionary::SynonymDictionary;
use super::types::{SynonymsResponse, UpdateSynonymsRequest};
use crate::error::ApiError;

use axum::extract::Path;
use axum::{Extension, Json};
use serde_json::Value;
use std::sync::Arc;

pub async fn handle_get_synonyms(
    Extension(dictionary): Extension<Arc<SynonymDictionary>>,
) -> Result<Json<SynonymsResponse>, ApiError> {
    match dictionary.read_raw().await {
        Ok(Some(raw)) => Ok(Json(SynonymsResponse::success(raw))),
        Ok(None) => Err(ApiError::NotFound("Dictionary file not found".to_string())),
        Err(e) => {
            tracing::error!("Failed to read synonym dictionary: {}", e);
            Err(ApiError::internal("Failed to read dictionary", e))
        }
    }
}

pub async fn handle_update_synonyms(
    Extension(dictionary): Extension<Arc<SynonymDictionary>>,
    Path(term): Path<String>,
    Json(req): Json<UpdateSynonymsRequest>,
) -> Result<Json<SynonymsResponse>, ApiError> {
    let synonyms = validate_synonyms(req.synonyms.as_ref()).map_err(|details| {
        ApiError::Unprocessable {
            error: "Invalid synonyms".to_string(),
            details,
        }
    })?;

    match dictionary.update(&term, &synonyms).await {
        Ok(raw) => {
            tracing::info!("Updated synonyms for '{}' ({} entries)", term, synonyms.len());
            Ok(Json(SynonymsResponse::success(raw)))
        }
        Err(e) => {
            tracing::error!("Failed to update synonyms for '{}': {}", term, e);
            Err(ApiError::internal("Failed to update dictionary", e))
        }
    }
}

/// Requires a non-empty array whose every element is exactly
/// `[string, number]`. Numeric strings such as `"0.5"` count as numbers.
pub fn validate_synonyms(value: Option<&Value>) -> Result<Vec<(String, f64)>, String> {
    let pairs = match value {
        Some(Value::Array(pairs)) if !pairs.is_empty() => pairs,
        Some(Value::Array(_)) | None | Some(Value::Null) => {
            return Err("The synonyms field is required.".to_string());
        }
        Some(_) => return Err("The synonyms field must be an array.".to_string()),
    };

    pairs
        .iter()
        .enumerate()
        .map(|(i, pair)| match pair.as_array().map(Vec::as_slice) {
            Some([Value::String(term), weight]) => numeric(weight)
                .map(|w| (term.clone(), w))
                .ok_or_else(|| format!("synonyms.{}.1 must be numeric", i)),
            Some([_, _]) => Err(format!("synonyms.{}.0 must be a string", i)),
            _ => Err(format!("synonyms.{} must be a [term, weight] pair", i)),
        })
        .collect()
}

fn numeric(value: &Value) -> Option<f64> {
    let weight = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    weight.is_finite().then_some(weight)
}
