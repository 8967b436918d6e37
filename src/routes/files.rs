//! Transient PDF serving
//!
//! The OCR service fetches uploaded PDFs back through this route.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::storage::BlobId;

pub fn router() -> Router<AppState> {
    Router::new().route("/files/:file_id", get(serve_file))
}

async fn serve_file(State(state): State<AppState>, Path(file_id): Path<String>) -> Result<Response> {
    let id = BlobId::parse(&file_id)
        .ok_or_else(|| AppError::NotFound(format!("File not found: {}", file_id)))?;

    let blob = state.blobs().get(&id).await?;
    let filename = blob.metadata.filename.replace('"', "");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/pdf")
        .header(header::CONTENT_LENGTH, blob.data.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", filename),
        )
        .body(Body::from(blob.data))
        .map_err(|e| AppError::Internal(e.to_string()))
}
