//! Ingestion types

use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::StorageError;
use crate::imaging::ImageError;
use crate::ocr::OcrError;

/// Accepted upload content types
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &["application/pdf", "image/jpeg", "image/png"];

/// Length of an image article id
pub const IMAGE_ID_LEN: usize = 16;

/// A file received over HTTP, owned by the request handling it
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Vec<u8>,
    /// MIME type as declared by the client
    pub content_type: String,
    pub filename: String,
}

/// Processing route chosen from the declared content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// PDF, OCRed by URL
    Document,
    /// JPEG or PNG, OCRed inline
    Image,
}

impl UploadKind {
    /// Route by exact MIME type. Contents are not sniffed.
    pub fn from_content_type(content_type: &str) -> Result<Self, IngestError> {
        match content_type {
            "application/pdf" => Ok(Self::Document),
            "image/jpeg" | "image/png" => Ok(Self::Image),
            other => Err(IngestError::UnsupportedContentType(other.to_string())),
        }
    }
}

/// Fresh short id for an image article
pub fn generate_image_id() -> String {
    let mut id = Uuid::new_v4().to_string();
    id.truncate(IMAGE_ID_LEN);
    id
}

/// Ingestion error types
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Only PDF, JPEG, and PNG files are supported (got {0:?})")]
    UnsupportedContentType(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Error processing document: {0}")]
    OcrFailure(String),

    #[error("Failed to store document content after {attempts} attempts")]
    StorageFailure { attempts: u32 },

    #[error("Blob store error: {0}")]
    Blob(#[from] StorageError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::UnsupportedContentType(_) | Self::InvalidArgument(_) | Self::Decode(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnsupportedContentType(_) => "unsupported_content_type",
            Self::InvalidArgument(_) => "invalid_argument",
            Self::Decode(_) => "decode_error",
            Self::OcrFailure(_) => "ocr_failure",
            Self::StorageFailure { .. } => "storage_failure",
            Self::Blob(_) => "storage_error",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl From<OcrError> for IngestError {
    fn from(err: OcrError) -> Self {
        IngestError::OcrFailure(err.to_string())
    }
}

impl From<ImageError> for IngestError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidBase64(msg) => IngestError::InvalidArgument(msg),
            ImageError::Decode(msg) => IngestError::Decode(msg),
            other => IngestError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routing() {
        assert_eq!(UploadKind::from_content_type("application/pdf").unwrap(), UploadKind::Document);
        assert_eq!(UploadKind::from_content_type("image/jpeg").unwrap(), UploadKind::Image);
        assert_eq!(UploadKind::from_content_type("image/png").unwrap(), UploadKind::Image);

        for rejected in ["text/plain", "image/gif", "application/pdf; charset=binary", "", "IMAGE/PNG"] {
            assert!(matches!(
                UploadKind::from_content_type(rejected),
                Err(IngestError::UnsupportedContentType(_))
            ));
        }
    }

    #[test]
    fn test_supported_list_matches_routing() {
        for content_type in SUPPORTED_CONTENT_TYPES {
            assert!(UploadKind::from_content_type(content_type).is_ok());
        }
    }

    #[test]
    fn test_image_id_shape() {
        let id = generate_image_id();
        assert_eq!(id.len(), IMAGE_ID_LEN);
        assert_ne!(id, generate_image_id());
    }

    #[test]
    fn test_error_mapping() {
        let err: IngestError = ImageError::InvalidBase64("bad".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let err: IngestError = ImageError::Decode("bad".into()).into();
        assert_eq!(err.code(), "decode_error");

        let err: IngestError = OcrError::EmptyResult.into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.to_string().contains("empty result"));
    }
}
