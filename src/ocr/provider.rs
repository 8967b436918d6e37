//! OCR Providers
//!
//! Defines the client trait and the Mistral OCR API implementation.

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;

use super::types::{OcrError, OcrResult};
use crate::config::OcrConfig;

/// OCR client trait
#[async_trait]
pub trait OcrClient: Send + Sync {
    /// OCR a document the API downloads from `url`. Embedded images are requested.
    async fn process_document_url(&self, url: &str) -> Result<OcrResult, OcrError>;

    /// OCR a normalized JPEG submitted inline. Text and structure only.
    async fn process_image_inline(&self, jpeg: &[u8]) -> Result<OcrResult, OcrError>;
}

/// Check a document URL before any network call, returning it trimmed
pub fn validate_document_url(url: &str) -> Result<&str, OcrError> {
    let trimmed = url.trim();

    if trimmed.is_empty() {
        return Err(OcrError::InvalidArgument(format!(
            "Invalid file_url provided: {:?}",
            url
        )));
    }

    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(OcrError::InvalidArgument(format!(
            "URL must start with http:// or https://: {}",
            trimmed
        )));
    }

    Ok(trimmed)
}

#[derive(Serialize)]
struct OcrRequest<'a> {
    model: &'a str,
    document: DocumentChunk<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    include_image_base64: Option<bool>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DocumentChunk<'a> {
    DocumentUrl { document_url: &'a str },
    ImageUrl { image_url: String },
}

/// Mistral OCR API client
pub struct MistralOcrClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl MistralOcrClient {
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| OcrError::ApiError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!("{}/v1/ocr", config.base_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    async fn submit(&self, request: &OcrRequest<'_>) -> Result<OcrResult, OcrError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call OCR API: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "OCR API returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        OcrResult::from_value(result)
    }
}

#[async_trait]
impl OcrClient for MistralOcrClient {
    async fn process_document_url(&self, url: &str) -> Result<OcrResult, OcrError> {
        let url = validate_document_url(url)?;

        tracing::debug!(url = %url, model = %self.model, "Submitting document to OCR");

        self.submit(&OcrRequest {
            model: &self.model,
            document: DocumentChunk::DocumentUrl { document_url: url },
            include_image_base64: Some(true),
        })
        .await
    }

    async fn process_image_inline(&self, jpeg: &[u8]) -> Result<OcrResult, OcrError> {
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(jpeg);

        tracing::debug!(bytes = jpeg.len(), model = %self.model, "Submitting inline image to OCR");

        self.submit(&OcrRequest {
            model: &self.model,
            document: DocumentChunk::ImageUrl {
                image_url: format!("data:image/jpeg;base64,{}", image_base64),
            },
            include_image_base64: None,
        })
        .await
    }
}

/// Scripted client for testing
#[cfg(test)]
pub struct MockOcrClient {
    /// Returned on every call; `None` fails with an API error
    pub response: Option<serde_json::Value>,
    pub calls: std::sync::atomic::AtomicUsize,
    pub urls: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockOcrClient {
    pub fn returning(response: serde_json::Value) -> Self {
        Self {
            response: Some(response),
            calls: Default::default(),
            urls: Default::default(),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: None,
            calls: Default::default(),
            urls: Default::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn respond(&self) -> Result<OcrResult, OcrError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.response {
            Some(value) => OcrResult::from_value(value.clone()),
            None => Err(OcrError::ApiError("upstream unavailable".to_string())),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrClient for MockOcrClient {
    async fn process_document_url(&self, url: &str) -> Result<OcrResult, OcrError> {
        let url = validate_document_url(url)?;
        self.urls.lock().unwrap().push(url.to_string());
        self.respond()
    }

    async fn process_image_inline(&self, jpeg: &[u8]) -> Result<OcrResult, OcrError> {
        // Inline submissions are always normalized JPEG
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        self.respond()
    }
}
