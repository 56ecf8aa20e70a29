//! Stored article lookup.
//!
//! GET /api/v1/articles/{id}

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};

use newsvec_core::article::store::ArticleStore;
use newsvec_types::article::ArticleRecord;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

pub async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ArticleRecord>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let record = state
        .store
        .get(std::slice::from_ref(&id))
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::ArticleNotFound(id))?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(record, request_id, elapsed)))
}
