//! Error types for the Pamphlets server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::ingest::IngestError;

/// Application-wide result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Blob store error: {0}")]
    Storage(#[from] StorageError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Ingest(#[from] IngestError),
}

/// Blob store errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),
}

/// Error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
            AppError::Storage(e) => match e {
                StorageError::ObjectNotFound(key) => {
                    (StatusCode::NOT_FOUND, "not_found", format!("File not found: {}", key))
                }
                _ => {
                    tracing::error!("Blob store error: {}", e);
                    (StatusCode::INTERNAL_SERVER_ERROR, "storage_error", e.to_string())
                }
            },
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "database_error", self.to_string())
            }
            AppError::Ingest(e) => {
                let status = e.status_code();
                if status.is_server_error() {
                    tracing::error!(code = e.code(), "Upload failed: {}", e);
                } else {
                    tracing::warn!(code = e.code(), "Upload rejected: {}", e);
                }
                (status, e.code(), e.to_string())
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: error_type,
                message,
            }),
        )
            .into_response()
    }
}
