//! Upload pipeline

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;

use super::types::{generate_image_id, IngestError, UploadKind, UploadedFile};
use crate::config::IngestConfig;
use crate::db::ArticleStore;
use crate::imaging;
use crate::ocr::{OcrClient, OcrResult};
use crate::storage::{BlobId, BlobReference, BlobStore};

/// Runs uploads through OCR into the article store
pub struct Ingestor {
    blobs: Arc<dyn BlobStore>,
    ocr: Arc<dyn OcrClient>,
    articles: Arc<dyn ArticleStore>,
    config: IngestConfig,
    /// Upper bound on a single OCR call
    ocr_deadline: Duration,
}

impl Ingestor {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        ocr: Arc<dyn OcrClient>,
        articles: Arc<dyn ArticleStore>,
        config: IngestConfig,
        ocr_deadline: Duration,
    ) -> Self {
        Self {
            blobs,
            ocr,
            articles,
            config,
            ocr_deadline,
        }
    }

    /// Process one upload and return its article id
    pub async fn ingest(&self, file: UploadedFile) -> Result<String, IngestError> {
        let kind = UploadKind::from_content_type(&file.content_type)?;

        tracing::info!(
            filename = %file.filename,
            content_type = %file.content_type,
            size = file.data.len(),
            ?kind,
            "Upload routed"
        );

        let (article_id, result, blob) = match kind {
            UploadKind::Document => {
                let (blob, result) = self.ocr_document(file).await?;
                (blob.id.to_string(), result, Some(blob.id))
            }
            UploadKind::Image => {
                let (article_id, result) = self.ocr_image(file).await?;
                (article_id, result, None)
            }
        };

        tracing::info!(
            article_id = %article_id,
            pages = result.page_count(),
            "OCR complete"
        );

        self.store_with_retry(&article_id, &result).await?;

        if let Some(blob_id) = blob {
            self.cleanup(&blob_id).await;
        }

        Ok(article_id)
    }

    /// Park the PDF in the blob store and have the OCR service fetch it
    async fn ocr_document(&self, file: UploadedFile) -> Result<(BlobReference, OcrResult), IngestError> {
        let id = self
            .blobs
            .put(file.data, &file.filename, "application/pdf")
            .await?;
        let blob = BlobReference {
            url: self.config.file_url(id.as_str()),
            id,
        };

        tracing::debug!(blob_id = %blob.id, url = %blob.url, "Submitting document for OCR");

        let result = self
            .with_ocr_deadline(self.ocr.process_document_url(&blob.url))
            .await?;

        Ok((blob, result))
    }

    /// Normalize the image off the async runtime and submit it inline
    async fn ocr_image(&self, file: UploadedFile) -> Result<(String, OcrResult), IngestError> {
        let article_id = generate_image_id();
        let quality = self.config.jpeg_quality;

        let jpeg = tokio::task::spawn_blocking(move || imaging::normalize(&file.data, quality))
            .await
            .map_err(|e| IngestError::Internal(format!("Normalization worker failed: {}", e)))??;

        tracing::debug!(article_id = %article_id, bytes = jpeg.len(), "Submitting image for OCR");

        let result = self
            .with_ocr_deadline(self.ocr.process_image_inline(&jpeg))
            .await?;

        Ok((article_id, result))
    }

    async fn with_ocr_deadline<F>(&self, call: F) -> Result<OcrResult, IngestError>
    where
        F: std::future::Future<Output = Result<OcrResult, crate::ocr::OcrError>>,
    {
        match timeout(self.ocr_deadline, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(IngestError::OcrFailure(format!(
                "OCR call timed out after {:?}",
                self.ocr_deadline
            ))),
        }
    }

    /// Upsert with a bounded number of attempts and a fixed pause between them
    async fn store_with_retry(&self, article_id: &str, result: &OcrResult) -> Result<(), IngestError> {
        let attempts = self.config.store_attempts.max(1);
        let delay = self.config.store_retry_delay();
        let mut timed_out = false;

        for attempt in 1..=attempts {
            let stored = match timeout(self.config.store_timeout(), self.articles.upsert(article_id, result)).await {
                Ok(stored) => stored,
                Err(_) => {
                    tracing::warn!(article_id = %article_id, attempt, "Store attempt timed out");
                    timed_out = true;
                    false
                }
            };

            if stored {
                tracing::info!(article_id = %article_id, attempt, "Article stored");
                return Ok(());
            }

            tracing::warn!(article_id = %article_id, "Attempt {}/{} failed", attempt, attempts);

            if attempt < attempts {
                tokio::time::sleep(delay).await;
            }
        }

        // An abandoned attempt may still have committed after its deadline
        if timed_out && self.committed_late(article_id, result).await {
            tracing::warn!(article_id = %article_id, "Timed-out store attempt committed; keeping it");
            return Ok(());
        }

        Err(IngestError::StorageFailure { attempts })
    }

    /// Whether the stored content already equals `result`
    async fn committed_late(&self, article_id: &str, result: &OcrResult) -> bool {
        match timeout(self.config.store_timeout(), self.articles.fetch(article_id)).await {
            Ok(Ok(Some(stored))) => stored.as_object() == Some(result.as_map()),
            Ok(Ok(None)) => false,
            Ok(Err(e)) => {
                tracing::warn!(article_id = %article_id, "Could not check for a late commit: {}", e);
                false
            }
            Err(_) => false,
        }
    }

    /// Drop the transient blob. Failures are logged, never propagated.
    async fn cleanup(&self, blob_id: &BlobId) {
        match self.blobs.delete(blob_id).await {
            Ok(()) => tracing::info!(blob_id = %blob_id, "Deleted transient upload blob"),
            Err(e) => tracing::warn!(blob_id = %blob_id, "Could not delete upload blob: {}", e),
        }
    }
}
