//! GET /api/v1/health - Store size and embedding backend.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use newsvec_core::article::store::ArticleStore;
use newsvec_core::embedding::embedder::Embedder;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub articles: u64,
    pub embedding_model: String,
    pub embedding_dimension: usize,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<ApiResponse<Health>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let articles = state.store.count().await?;
    let data = Health {
        status: "ok",
        articles,
        embedding_model: state.embedder.model_name().to_string(),
        embedding_dimension: state.embedder.dimension(),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    Ok(Json(ApiResponse::success(data, request_id, elapsed)))
}
