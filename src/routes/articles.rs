//! Article retrieval

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/articles/:article_id", get(get_article))
}

/// Stored OCR content, exactly as the OCR service returned it
async fn get_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<Value>> {
    state
        .articles()
        .fetch(&article_id)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to retrieve article: {}", e)))?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Article not found: {}", article_id)))
}
