//! OCR Types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Structured extraction result returned by the OCR API
///
/// Kept as the free-form mapping the API produced so that it is stored
/// verbatim. Typical keys are `pages` (each with `index`, `markdown`,
/// `images`, `dimensions`), `model` and `usage_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OcrResult(Map<String, Value>);

impl OcrResult {
    /// Wrap an API response. Anything but a non-empty object is an empty result.
    pub fn from_value(value: Value) -> Result<Self, OcrError> {
        match value {
            Value::Object(map) if !map.is_empty() => Ok(Self(map)),
            _ => Err(OcrError::EmptyResult),
        }
    }

    /// Markdown text of each page, in page order
    pub fn pages(&self) -> Vec<&str> {
        self.0
            .get("pages")
            .and_then(Value::as_array)
            .map(|pages| {
                pages
                    .iter()
                    .filter_map(|p| p.get("markdown").and_then(Value::as_str))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn page_count(&self) -> usize {
        self.0
            .get("pages")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// OCR error types
#[derive(Debug, thiserror::Error)]
pub enum OcrError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("OCR processing failed: {0}")]
    ApiError(String),

    #[error("OCR processing returned empty result")]
    EmptyResult,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_responses_are_rejected() {
        assert!(matches!(OcrResult::from_value(Value::Null), Err(OcrError::EmptyResult)));
        assert!(matches!(OcrResult::from_value(json!({})), Err(OcrError::EmptyResult)));
        assert!(matches!(OcrResult::from_value(json!([1, 2])), Err(OcrError::EmptyResult)));
    }

    #[test]
    fn test_pages() {
        let result = OcrResult::from_value(json!({
            "model": "mistral-ocr-latest",
            "pages": [
                { "index": 0, "markdown": "# Title", "images": [] },
                { "index": 1, "markdown": "Body text", "images": [] }
            ]
        }))
        .unwrap();

        assert_eq!(result.page_count(), 2);
        assert_eq!(result.pages(), vec!["# Title", "Body text"]);
    }

    #[test]
    fn test_serializes_transparently() {
        let value = json!({ "pages": [{ "markdown": "x" }] });
        let result = OcrResult::from_value(value.clone()).unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), value);
    }
}
