//! OCR Module
//!
//! Client side of the remote OCR API. Two submission styles are supported:
//! - documents by URL (the API fetches `GET /files/{id}` from this server)
//! - images inline, as a base64 JPEG data URL
//!
//! Calls are single-shot; retry and deadline policy belong to the caller.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pamphlets_server::ocr::{MistralOcrClient, OcrClient};
//!
//! let client = MistralOcrClient::new(&config.ocr)?;
//! let result = client
//!     .process_document_url("https://pamphlets.example.com/files/67f309db84159383bd889930")
//!     .await?;
//! println!("{} pages", result.page_count());
//! ```

mod provider;
mod types;

pub use provider::{validate_document_url, MistralOcrClient, OcrClient};
pub use types::{OcrError, OcrResult};

#[cfg(test)]
pub use provider::MockOcrClient;
