//! PostgreSQL implementation of the short URL repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortUrl, ShortUrl};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// PostgreSQL repository for short URL storage and lookup.
///
/// Uniqueness of `short_code` is enforced by the `urls_short_code_key`
/// constraint; violations surface as [`AppError::Conflict`] through the
/// `From<sqlx::Error>` conversion.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn create(&self, new_url: NewShortUrl) -> Result<ShortUrl, AppError> {
        let row = sqlx::query_as::<_, ShortUrl>(
            r#"
            INSERT INTO urls (short_code, original_url, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, short_code, original_url, expires_at, created_at, updated_at
            "#,
        )
        .bind(&new_url.short_code)
        .bind(&new_url.original_url)
        .bind(new_url.expires_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortUrl>, AppError> {
        let row = sqlx::query_as::<_, ShortUrl>(
            r#"
            SELECT id, short_code, original_url, expires_at, created_at, updated_at
            FROM urls
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM urls WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn list_codes(&self) -> Result<Vec<String>, AppError> {
        let codes: Vec<String> = sqlx::query_scalar("SELECT short_code FROM urls")
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(codes)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM urls")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(total)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }
}
