//! Batch normalization and OCR across a fixed worker pool

use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::stream::{self, StreamExt};

use super::{normalize, normalize_file, ImageError};
use crate::ocr::{OcrClient, OcrResult};

/// Number of images processed concurrently
pub const BATCH_WORKERS: usize = 4;

/// One input of a batch
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image file on local disk
    Path(PathBuf),
    /// Raw image bytes, base64 encoded
    Base64(String),
}

impl ImageSource {
    fn normalize(&self, quality: u8) -> Result<Vec<u8>, ImageError> {
        match self {
            ImageSource::Path(path) => normalize_file(path, quality),
            ImageSource::Base64(data) => {
                let raw = STANDARD
                    .decode(data.trim())
                    .map_err(|e| ImageError::InvalidBase64(e.to_string()))?;
                normalize(&raw, quality)
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            ImageSource::Path(path) => path.display().to_string(),
            ImageSource::Base64(data) => format!("<inline {} chars>", data.len()),
        }
    }
}

/// Normalize and OCR every image, at most [`BATCH_WORKERS`] at a time.
///
/// The output has one slot per input, in input order. A failed item leaves
/// `None` in its slot and does not affect the others.
pub async fn normalize_batch(
    ocr: &dyn OcrClient,
    images: Vec<ImageSource>,
    quality: u8,
) -> Vec<Option<OcrResult>> {
    let total = images.len();

    let results: Vec<Option<OcrResult>> = stream::iter(images.into_iter().enumerate())
        .map(|(index, source)| process_one(ocr, index, source, quality))
        .buffered(BATCH_WORKERS)
        .collect()
        .await;

    let succeeded = results.iter().filter(|r| r.is_some()).count();
    tracing::info!(total, succeeded, "Image batch complete");

    results
}

async fn process_one(
    ocr: &dyn OcrClient,
    index: usize,
    source: ImageSource,
    quality: u8,
) -> Option<OcrResult> {
    let label = source.describe();

    let jpeg = match tokio::task::spawn_blocking(move || source.normalize(quality)).await {
        Ok(Ok(jpeg)) => jpeg,
        Ok(Err(e)) => {
            tracing::warn!(index, source = %label, "Skipping batch image: {}", e);
            return None;
        }
        Err(e) => {
            tracing::error!(index, source = %label, "Normalization worker failed: {}", e);
            return None;
        }
    };

    match ocr.process_image_inline(&jpeg).await {
        Ok(result) => Some(result),
        Err(e) => {
            tracing::warn!(index, source = %label, "Batch image OCR failed: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::imaging::normalize::fixtures::png_bytes;
    use crate::imaging::DEFAULT_JPEG_QUALITY;
    use crate::ocr::{MockOcrClient, OcrError};

    #[tokio::test]
    async fn test_one_bad_image_yields_none_at_its_index() {
        let ocr = MockOcrClient::returning(json!({ "pages": [{ "markdown": "text" }] }));
        let good = STANDARD.encode(png_bytes());

        let images = vec![
            ImageSource::Base64(good.clone()),
            ImageSource::Base64(good.clone()),
            ImageSource::Base64(STANDARD.encode(b"corrupt")),
            ImageSource::Base64(good.clone()),
            ImageSource::Base64(good),
        ];

        let results = normalize_batch(&ocr, images, DEFAULT_JPEG_QUALITY).await;

        assert_eq!(results.len(), 5);
        assert!(results[2].is_none());
        for (i, result) in results.iter().enumerate() {
            if i != 2 {
                assert_eq!(result.as_ref().unwrap().pages(), vec!["text"]);
            }
        }
        assert_eq!(ocr.call_count(), 4);
    }

    #[tokio::test]
    async fn test_paths_and_missing_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let present = dir.path().join("sample_img.png");
        std::fs::write(&present, png_bytes()).unwrap();

        let ocr = MockOcrClient::returning(json!({ "pages": [] , "model": "m" }));
        let images = vec![
            ImageSource::Path(present),
            ImageSource::Path(dir.path().join("sample_img2.png")),
            ImageSource::Base64("%%%".to_string()),
        ];

        let results = normalize_batch(&ocr, images, DEFAULT_JPEG_QUALITY).await;
        assert_eq!(results.len(), 3);
        assert!(results[0].is_some());
        assert!(results[1].is_none());
        assert!(results[2].is_none());
    }

    #[tokio::test]
    async fn test_ocr_failure_is_isolated() {
        let ocr = MockOcrClient::failing();
        let images = vec![ImageSource::Base64(STANDARD.encode(png_bytes()))];

        let results = normalize_batch(&ocr, images, DEFAULT_JPEG_QUALITY).await;
        assert_eq!(results, vec![None]);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let ocr = MockOcrClient::failing();
        let results = normalize_batch(&ocr, Vec::new(), DEFAULT_JPEG_QUALITY).await;
        assert!(results.is_empty());
    }

    /// Tracks the peak number of concurrent OCR calls
    struct ConcurrencyCounter {
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl OcrClient for ConcurrencyCounter {
        async fn process_document_url(&self, _url: &str) -> Result<OcrResult, OcrError> {
            unreachable!()
        }

        async fn process_image_inline(&self, _jpeg: &[u8]) -> Result<OcrResult, OcrError> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            OcrResult::from_value(json!({ "pages": [] , "ok": true }))
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_capped() {
        let counter = ConcurrencyCounter {
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        };
        let good = STANDARD.encode(png_bytes());
        let images = (0..10).map(|_| ImageSource::Base64(good.clone())).collect();

        let results = normalize_batch(&counter, images, DEFAULT_JPEG_QUALITY).await;

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(Option::is_some));
        assert!(counter.peak.load(Ordering::SeqCst) <= BATCH_WORKERS);
    }
}
