//! Storage types

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Length of a blob id in hex characters
pub const BLOB_ID_LEN: usize = 24;

/// Identifier of a stored blob: 24 lowercase hex characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlobId(String);

impl BlobId {
    /// Generate a new random id
    pub fn generate() -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(hex[..BLOB_ID_LEN].to_string())
    }

    /// Parse a client-supplied id, rejecting anything that is not 24 hex digits
    pub fn parse(value: &str) -> Option<Self> {
        if value.len() == BLOB_ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(value.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A blob id together with the URL the OCR service fetches it from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobReference {
    pub id: BlobId,
    pub url: String,
}

/// Metadata recorded alongside blob bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobMetadata {
    pub id: BlobId,
    pub filename: String,
    pub content_type: String,
    pub size: i64,
}

/// A blob with its data
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub metadata: BlobMetadata,
    pub data: Vec<u8>,
}
