//! HTTP error responses.
//!
//! Every failure leaves the service as JSON with a stable `error` field and,
//! where there is something useful to say, a `details` field.

use crate::search::error::SearchError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    /// 400
    BadRequest(String),
    /// 404
    NotFound(String),
    /// 422, request body failed validation.
    Unprocessable { error: String, details: String },
    /// 500
    Internal { error: String, details: String },
}

impl ApiError {
    pub fn internal(error: &str, details: impl ToString) -> Self {
        ApiError::Internal {
            error: error.to_string(),
            details: details.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unprocessable { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(error) | ApiError::NotFound(error) => json!({ "error": error }),
            ApiError::Unprocessable { error, details } | ApiError::Internal { error, details } => {
                json!({ "error": error, "details": details })
            }
        };
        (status, Json(body)).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::MissingQuery => ApiError::BadRequest(e.to_string()),
            other => ApiError::internal("Search failed", other),
        }
    }
}
