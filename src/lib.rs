//! Pamphlets server
//!
//! Accepts PDF and image uploads, runs them through a hosted OCR service and
//! keeps the structured result as an article that can be fetched later.

pub mod config;
pub mod db;
pub mod error;
pub mod imaging;
pub mod ingest;
pub mod ocr;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::Config;
pub use error::{AppError, Result};
pub use state::AppState;
