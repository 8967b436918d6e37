//! Upload route
//!
//! Accepts a single multipart file and hands it to the ingestion pipeline.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    routing::post,
    Json, Router,
};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::ingest::UploadedFile;
use crate::state::AppState;

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub article_id: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/upload", post(upload))
}

async fn upload(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>> {
    let multipart = multipart.map_err(|e| {
        tracing::debug!("Upload is not a multipart form: {}", e);
        no_file()
    })?;
    let file = read_file_field(multipart).await?.ok_or_else(no_file)?;

    tracing::info!(
        filename = %file.filename,
        content_type = %file.content_type,
        size = file.data.len(),
        "Received upload"
    );

    // Run on its own task so a dropped connection does not abandon a half-finished upload
    let article_id = tokio::spawn(async move { state.ingestor().ingest(file).await })
        .await
        .map_err(|e| AppError::Internal(format!("Upload task failed: {}", e)))??;

    Ok(Json(UploadResponse { article_id }))
}

fn no_file() -> AppError {
    AppError::BadRequest("No file uploaded".to_string())
}

/// First field named `file`, or `None` if the form has none
async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {}", e)))?
    {
        if field.name() != Some(FILE_FIELD) {
            tracing::debug!(name = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read file data: {}", e)))?;

        return Ok(Some(UploadedFile {
            data: data.to_vec(),
            content_type,
            filename,
        }));
    }

    Ok(None)
}
