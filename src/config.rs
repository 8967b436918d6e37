//! Configuration management for the Pamphlets server

use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub database: DatabaseConfig,
    pub ocr: OcrConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted upload body in bytes
    pub max_upload_bytes: usize,
    /// Allowed CORS origins (empty = any)
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    /// S3-compatible bucket (MinIO, R2, AWS)
    S3,
    /// In-process map, lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub min_connections: u32,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Knobs for the upload pipeline
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    /// Externally reachable base address used to build `/files/{id}` links
    pub backend_url: String,
    /// Total store attempts, including the first
    pub store_attempts: u32,
    pub store_retry_delay_ms: u64,
    pub store_timeout_secs: u64,
    /// JPEG quality (1-100) for normalized images
    pub jpeg_quality: u8,
}

impl IngestConfig {
    pub fn store_retry_delay(&self) -> Duration {
        Duration::from_millis(self.store_retry_delay_ms)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Fetch URL for a stored blob, as seen by the OCR service
    pub fn file_url(&self, blob_id: &str) -> String {
        format!("{}/files/{}", self.backend_url.trim_end_matches('/'), blob_id)
    }
}

impl OcrConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
                max_upload_bytes: 50 * 1024 * 1024,
                cors_allowed_origins: Vec::new(),
            },
            storage: StorageConfig {
                provider: StorageProvider::S3,
                endpoint: "http://localhost:9000".to_string(),
                bucket: "pamphlets".to_string(),
                access_key: "admin".to_string(),
                secret_key: "password123".to_string(),
                region: Some("us-east-1".to_string()),
            },
            database: DatabaseConfig {
                url: "sqlite:./pamphlets.db".to_string(),
                min_connections: 1,
                max_connections: 10,
            },
            ocr: OcrConfig {
                api_key: String::new(),
                base_url: "https://api.mistral.ai".to_string(),
                model: "mistral-ocr-latest".to_string(),
                timeout_secs: 120,
            },
            ingest: IngestConfig {
                backend_url: "http://localhost:8000".to_string(),
                store_attempts: 3,
                store_retry_delay_ms: 1000,
                store_timeout_secs: 30,
                jpeg_quality: 85,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let provider = match env::var("BLOB_STORE").unwrap_or_else(|_| "s3".to_string()).as_str() {
            "memory" => StorageProvider::Memory,
            "s3" => StorageProvider::S3,
            other => {
                return Err(ConfigError::Invalid {
                    name: "BLOB_STORE",
                    value: other.to_string(),
                })
            }
        };

        // S3 credentials are only mandatory when the bucket is actually used
        let s3_var = |name: &'static str, default: &str| -> Result<String, ConfigError> {
            match env::var(name) {
                Ok(value) => Ok(value),
                Err(_) if provider == StorageProvider::Memory => Ok(default.to_string()),
                Err(_) => Err(ConfigError::Missing(name)),
            }
        };

        let jpeg_quality: u8 = parse_var("JPEG_QUALITY", defaults.ingest.jpeg_quality)?;
        if !(1..=100).contains(&jpeg_quality) {
            return Err(ConfigError::Invalid {
                name: "JPEG_QUALITY",
                value: jpeg_quality.to_string(),
            });
        }

        let store_attempts: u32 = parse_var("STORE_ATTEMPTS", defaults.ingest.store_attempts)?;
        if store_attempts == 0 {
            return Err(ConfigError::Invalid {
                name: "STORE_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or(defaults.server.host),
                port: parse_var("SERVER_PORT", defaults.server.port)?,
                max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", defaults.server.max_upload_bytes)?,
                cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .map(|v| split_list(&v))
                    .unwrap_or_default(),
            },
            storage: StorageConfig {
                provider,
                endpoint: s3_var("S3_ENDPOINT", &defaults.storage.endpoint)?,
                bucket: s3_var("S3_BUCKET", &defaults.storage.bucket)?,
                access_key: s3_var("S3_ACCESS_KEY", &defaults.storage.access_key)?,
                secret_key: s3_var("S3_SECRET_KEY", &defaults.storage.secret_key)?,
                region: env::var("S3_REGION").ok().or(defaults.storage.region),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.database.url),
                min_connections: parse_var("DATABASE_MIN_CONNECTIONS", defaults.database.min_connections)?,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", defaults.database.max_connections)?,
            },
            ocr: OcrConfig {
                api_key: env::var("MISTRAL_API_KEY").map_err(|_| ConfigError::Missing("MISTRAL_API_KEY"))?,
                base_url: env::var("OCR_BASE_URL").unwrap_or(defaults.ocr.base_url),
                model: env::var("OCR_MODEL").unwrap_or(defaults.ocr.model),
                timeout_secs: parse_var("OCR_TIMEOUT_SECS", defaults.ocr.timeout_secs)?,
            },
            ingest: IngestConfig {
                backend_url: env::var("BACKEND_URL").map_err(|_| ConfigError::Missing("BACKEND_URL"))?,
                store_attempts,
                store_retry_delay_ms: parse_var("STORE_RETRY_DELAY_MS", defaults.ingest.store_retry_delay_ms)?,
                store_timeout_secs: parse_var("STORE_TIMEOUT_SECS", defaults.ingest.store_timeout_secs)?,
                jpeg_quality,
            },
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_url_normalizes_trailing_slash() {
        let mut ingest = Config::default().ingest;

        ingest.backend_url = "https://api.example.com/".to_string();
        assert_eq!(ingest.file_url("abc"), "https://api.example.com/files/abc");

        ingest.backend_url = "https://api.example.com".to_string();
        assert_eq!(ingest.file_url("abc"), "https://api.example.com/files/abc");
    }

    #[test]
    fn test_defaults_match_pipeline_contract() {
        let config = Config::default();
        assert_eq!(config.ingest.store_attempts, 3);
        assert_eq!(config.ingest.store_retry_delay(), Duration::from_secs(1));
        assert_eq!(config.ingest.jpeg_quality, 85);
        assert_eq!(config.database.min_connections, 1);
        assert_eq!(config.database.max_connections, 10);
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("http://localhost:3000, https://pamphlets.example.com ,"),
            vec!["http://localhost:3000", "https://pamphlets.example.com"]
        );
        assert!(split_list("").is_empty());
    }
}
