//! Blob storage for uploaded documents
//!
//! Raw PDF bytes live here only until their OCR result is stored. The OCR
//! service fetches them back through `GET /files/{id}`.
//!
//! Backends:
//! - S3-compatible buckets (MinIO, Cloudflare R2, AWS S3)
//! - In-process memory (local runs and tests)

mod memory;
mod s3_client;
mod types;

pub use memory::MemoryBlobStore;
pub use s3_client::S3BlobStore;
pub use types::*;

use async_trait::async_trait;

use crate::error::StorageError;

/// Blob store backend
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist bytes under a freshly generated id
    async fn put(&self, data: Vec<u8>, filename: &str, content_type: &str) -> Result<BlobId, StorageError>;

    /// Fetch a blob, `ObjectNotFound` if absent
    async fn get(&self, id: &BlobId) -> Result<StoredBlob, StorageError>;

    /// Remove a blob. Deleting an absent blob succeeds.
    async fn delete(&self, id: &BlobId) -> Result<(), StorageError>;
}
