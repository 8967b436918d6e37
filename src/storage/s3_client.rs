//! S3-compatible blob store
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};

use super::types::{BlobId, BlobMetadata, StoredBlob};
use super::BlobStore;
use crate::config::StorageConfig;
use crate::error::StorageError;

/// Key prefix for uploaded documents
const UPLOAD_PREFIX: &str = "uploads";

/// User metadata key holding the original filename
const FILENAME_META: &str = "filename";

/// S3-compatible blob store
#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
}

impl S3BlobStore {
    /// Create a new S3 client from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "pamphlets",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(true) // Required for MinIO and other S3-compatible services
            .build();

        let client = Client::from_conf(s3_config);

        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    e
                );
            }
        }

        Ok(Self { client, bucket })
    }
}

fn object_key(id: &BlobId) -> String {
    format!("{}/{}", UPLOAD_PREFIX, id)
}

/// S3 user metadata must be ASCII
fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .collect()
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, data: Vec<u8>, filename: &str, content_type: &str) -> Result<BlobId, StorageError> {
        let id = BlobId::generate();
        let key = object_key(&id);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(content_type)
            .metadata(FILENAME_META, ascii_filename(filename))
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to put object {}: {}", key, e)))?;

        tracing::debug!(blob_id = %id, bucket = %self.bucket, "Stored upload blob");
        Ok(id)
    }

    async fn get(&self, id: &BlobId) -> Result<StoredBlob, StorageError> {
        let key = object_key(id);

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_no_such_key())
                    .unwrap_or(false);
                if missing || e.to_string().contains("404") {
                    StorageError::ObjectNotFound(id.to_string())
                } else {
                    StorageError::SdkError(format!("Failed to get object {}: {}", key, e))
                }
            })?;

        let filename = response
            .metadata()
            .and_then(|m| m.get(FILENAME_META))
            .cloned()
            .unwrap_or_else(|| format!("{}.pdf", id));
        let content_type = response
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(StoredBlob {
            metadata: BlobMetadata {
                id: id.clone(),
                filename,
                content_type,
                size: data.len() as i64,
            },
            data,
        })
    }

    async fn delete(&self, id: &BlobId) -> Result<(), StorageError> {
        let key = object_key(id);

        // S3 reports success for absent keys
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to delete object {}: {}", key, e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key() {
        let id = BlobId::parse("67f309db84159383bd889930").unwrap();
        assert_eq!(object_key(&id), "uploads/67f309db84159383bd889930");
    }

    #[test]
    fn test_ascii_filename() {
        assert_eq!(ascii_filename("sample.pdf"), "sample.pdf");
        assert_eq!(ascii_filename("résumé 2.pdf"), "r_sum_ 2.pdf");
    }
}
