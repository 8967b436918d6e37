//! Upload ingestion
//!
//! Drives one upload from receipt to a stored article:
//!
//! ```text
//! Received -> Routed -> (Normalized) -> OcrSubmitted -> Stored -> CleanedUp -> Done
//! ```
//!
//! Any step may end the request in failure. PDFs are parked in the blob store
//! so the OCR service can fetch them by URL; images are normalized and sent
//! inline and never touch the blob store.

mod pipeline;
mod types;

pub use pipeline::Ingestor;
pub use types::*;
