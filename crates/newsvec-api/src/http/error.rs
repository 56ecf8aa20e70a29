//! Application error type mapping to HTTP status codes and envelope format.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use newsvec_types::error::{RecommendError, StoreError};

use super::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    Recommend(RecommendError),
    Store(StoreError),
    /// No stored article has this id.
    ArticleNotFound(String),
    Validation(String),
}

impl From<RecommendError> for AppError {
    fn from(e: RecommendError) -> Self {
        AppError::Recommend(e)
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::Store(e)
    }
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Recommend(RecommendError::NotFound(_)) | AppError::ArticleNotFound(_) => {
                (StatusCode::NOT_FOUND, "ARTICLE_NOT_FOUND")
            }
            AppError::Recommend(RecommendError::MalformedRecord { .. }) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_RECORD")
            }
            AppError::Recommend(RecommendError::InvalidRequest(_)) | AppError::Validation(_) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR")
            }
            AppError::Recommend(RecommendError::EmbeddingFailed) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "EMBEDDING_FAILED")
            }
            AppError::Recommend(RecommendError::Pipeline(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PIPELINE_ERROR")
            }
            AppError::Recommend(RecommendError::Store(_)) | AppError::Store(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            AppError::Recommend(e) => e.to_string(),
            AppError::Store(e) => e.to_string(),
            AppError::ArticleNotFound(id) => format!("article '{id}' not found"),
            AppError::Validation(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(code, error = %self.message(), "request failed");
        }

        let body = ApiResponse::error(code, self.message(), uuid::Uuid::now_v7().to_string());
        (status, Json(body)).into_response()
    }
}
