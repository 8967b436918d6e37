//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Articles table: one OCR result per uploaded file
CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    -- OCR result (JSON)
    content TEXT NOT NULL,
    -- Reader comments (JSON), managed outside the upload flow
    comments TEXT NOT NULL DEFAULT '{}',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
