//! Image normalization
//!
//! Uploaded rasters are re-encoded as baseline JPEG before inline OCR
//! submission: decoded, flattened to RGB (alpha dropped), then encoded at a
//! fixed quality factor.

mod batch;
pub(crate) mod normalize;

pub use batch::{normalize_batch, ImageSource, BATCH_WORKERS};
pub use normalize::{normalize, normalize_base64, normalize_file, DEFAULT_JPEG_QUALITY};

/// Image processing errors
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Invalid base64 image data: {0}")]
    InvalidBase64(String),

    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Failed to encode JPEG: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
