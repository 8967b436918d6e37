//! Application state management

use std::sync::Arc;

use crate::config::{Config, StorageProvider};
use crate::db::{self, ArticleRepository, ArticleStore};
use crate::error::{AppError, StorageError};
use crate::ingest::Ingestor;
use crate::ocr::{MistralOcrClient, OcrClient, OcrError};
use crate::storage::{BlobStore, MemoryBlobStore, S3BlobStore};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize blob store: {0}")]
    BlobStore(#[from] StorageError),

    #[error("Failed to initialize database: {0}")]
    Database(#[from] AppError),

    #[error("Failed to initialize OCR client: {0}")]
    Ocr(#[from] OcrError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    blobs: Arc<dyn BlobStore>,
    articles: Arc<dyn ArticleStore>,
    ingestor: Ingestor,
}

impl AppState {
    /// Assemble state from already-built adapters
    pub fn new(
        config: Config,
        blobs: Arc<dyn BlobStore>,
        ocr: Arc<dyn OcrClient>,
        articles: Arc<dyn ArticleStore>,
    ) -> Self {
        let ingestor = Ingestor::new(
            blobs.clone(),
            ocr,
            articles.clone(),
            config.ingest.clone(),
            config.ocr.timeout(),
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                blobs,
                articles,
                ingestor,
            }),
        }
    }

    /// Connect every external collaborator named in the configuration
    pub async fn connect(config: Config) -> Result<Self, StateError> {
        let blobs: Arc<dyn BlobStore> = match config.storage.provider {
            StorageProvider::S3 => Arc::new(S3BlobStore::new(&config.storage).await?),
            StorageProvider::Memory => {
                tracing::warn!("Using in-memory blob store; uploads do not survive restarts");
                Arc::new(MemoryBlobStore::new())
            }
        };

        let pool = db::create_pool(&config.database).await?;
        tracing::info!("Database initialized at {}", config.database.url);

        let ocr = Arc::new(MistralOcrClient::new(&config.ocr)?);

        Ok(Self::new(
            config,
            blobs,
            ocr,
            Arc::new(ArticleRepository::new(pool)),
        ))
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// Get the blob store
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.blobs.as_ref()
    }

    /// Get the article store
    pub fn articles(&self) -> &dyn ArticleStore {
        self.inner.articles.as_ref()
    }

    /// Get the upload pipeline
    pub fn ingestor(&self) -> &Ingestor {
        &self.inner.ingestor
    }
}
