//! Recommendation endpoint.
//!
//! POST /api/v1/recommend - Articles similar to a stored article.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use newsvec_types::article::Recommendation;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub article_id: String,
    /// Overrides `[store] top_k` for this request.
    #[serde(default)]
    pub top_k: Option<usize>,
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<ApiResponse<Recommendation>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    if request.article_id.trim().is_empty() {
        return Err(AppError::Validation("article_id must not be empty".to_string()));
    }
    let top_k = request.top_k.unwrap_or(state.config.store.top_k);

    let recommendation = state
        .recommendation_service
        .recommend(&request.article_id, top_k)
        .await?;

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(recommendation, request_id, elapsed)))
}
