//! In-process blob store

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::types::{BlobId, BlobMetadata, StoredBlob};
use super::BlobStore;
use crate::error::StorageError;

/// Blob store backed by a map. Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<RwLock<HashMap<BlobId, StoredBlob>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, data: Vec<u8>, filename: &str, content_type: &str) -> Result<BlobId, StorageError> {
        let id = BlobId::generate();
        let blob = StoredBlob {
            metadata: BlobMetadata {
                id: id.clone(),
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                size: data.len() as i64,
            },
            data,
        };

        self.blobs.write().await.insert(id.clone(), blob);
        Ok(id)
    }

    async fn get(&self, id: &BlobId) -> Result<StoredBlob, StorageError> {
        self.blobs
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(id.to_string()))
    }

    async fn delete(&self, id: &BlobId) -> Result<(), StorageError> {
        self.blobs.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryBlobStore::new();

        let id = store
            .put(b"%PDF-1.4".to_vec(), "sample.pdf", "application/pdf")
            .await
            .unwrap();

        let blob = store.get(&id).await.unwrap();
        assert_eq!(blob.data, b"%PDF-1.4");
        assert_eq!(blob.metadata.filename, "sample.pdf");
        assert_eq!(blob.metadata.content_type, "application/pdf");
        assert_eq!(blob.metadata.size, 8);

        store.delete(&id).await.unwrap();
        assert!(matches!(
            store.get(&id).await,
            Err(StorageError::ObjectNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryBlobStore::new();
        let id = BlobId::generate();

        store.delete(&id).await.unwrap();
        store.delete(&id).await.unwrap();
        assert!(store.is_empty().await);
    }
}
