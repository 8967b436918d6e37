//! Article database operations

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::SqlitePool;

use crate::error::{AppError, Result};
use crate::ocr::OcrResult;

/// Persistence seam for OCR results
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Insert or overwrite the content of an article, leaving comments alone.
    ///
    /// Returns `false` on any storage error; the caller decides whether to retry.
    async fn upsert(&self, article_id: &str, content: &OcrResult) -> bool;

    /// Stored content, or `None` if no article has this id
    async fn fetch(&self, article_id: &str) -> Result<Option<Value>>;
}

/// Article record
#[derive(Debug, Clone)]
pub struct Article {
    pub id: String,
    pub content: Value,
    pub comments: Value,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct ArticleRow {
    id: String,
    content: String,
    comments: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ArticleRow> for Article {
    type Error = AppError;

    fn try_from(row: ArticleRow) -> Result<Self> {
        let parse = |column: &str, text: &str| -> Result<Value> {
            serde_json::from_str(text).map_err(|e| {
                AppError::Internal(format!("Corrupt {} for article {}: {}", column, row.id, e))
            })
        };

        Ok(Article {
            content: parse("content", &row.content)?,
            comments: parse("comments", &row.comments)?,
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Article repository
#[derive(Clone)]
pub struct ArticleRepository {
    pool: SqlitePool,
}

impl ArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a full article record
    pub async fn get(&self, id: &str) -> Result<Option<Article>> {
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, content, comments, created_at, updated_at
            FROM articles
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Article::try_from).transpose()
    }

    /// Insert or update content; a new row starts with empty comments
    pub async fn save_content(&self, id: &str, content: &OcrResult) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let content_json = serde_json::to_string(content)
            .map_err(|e| AppError::Internal(format!("Failed to serialize content: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO articles (id, content, comments, created_at, updated_at)
            VALUES (?, ?, '{}', ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                content = excluded.content,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(&content_json)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl ArticleStore for ArticleRepository {
    async fn upsert(&self, article_id: &str, content: &OcrResult) -> bool {
        match self.save_content(article_id, content).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(article_id = %article_id, "Error storing article content: {}", e);
                false
            }
        }
    }

    async fn fetch(&self, article_id: &str) -> Result<Option<Value>> {
        Ok(self.get(article_id).await?.map(|article| article.content))
    }
}

/// Store wrapper that fails a scripted number of upserts before delegating
#[cfg(test)]
pub struct FlakyArticleStore {
    pub inner: ArticleRepository,
    pub failures_left: std::sync::atomic::AtomicUsize,
    pub attempts: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl FlakyArticleStore {
    pub fn new(inner: ArticleRepository, failures: usize) -> Self {
        Self {
            inner,
            failures_left: std::sync::atomic::AtomicUsize::new(failures),
            attempts: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl ArticleStore for FlakyArticleStore {
    async fn upsert(&self, article_id: &str, content: &OcrResult) -> bool {
        use std::sync::atomic::Ordering;

        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return false;
        }
        self.inner.upsert(article_id, content).await
    }

    async fn fetch(&self, article_id: &str) -> Result<Option<Value>> {
        self.inner.fetch(article_id).await
    }
}
