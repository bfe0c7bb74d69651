//! PostgreSQL implementation of the click repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Click, ClickStats, NewClick};
use crate::domain::repositories::ClickRepository;
use crate::error::AppError;

/// PostgreSQL repository for redirect events.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, Click>(
            r#"
            INSERT INTO clicks (short_code, ip, user_agent, referer, clicked_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, short_code, ip, user_agent, referer, clicked_at
            "#,
        )
        .bind(&new_click.short_code)
        .bind(&new_click.ip)
        .bind(&new_click.user_agent)
        .bind(&new_click.referer)
        .bind(new_click.clicked_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(row)
    }

    async fn count(&self, short_code: Option<String>) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM clicks
            WHERE ($1::text IS NULL OR short_code = $1)
            "#,
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(total)
    }

    async fn stats(&self, short_code: &str) -> Result<ClickStats, AppError> {
        let stats = sqlx::query_as::<_, ClickStats>(
            r#"
            SELECT
                COUNT(*) AS total_clicks,
                COUNT(DISTINCT ip) AS unique_ips,
                MAX(clicked_at) AS last_click
            FROM clicks
            WHERE short_code = $1
            "#,
        )
        .bind(short_code)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(stats)
    }

    async fn recent(&self, short_code: &str, limit: i64) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, Click>(
            r#"
            SELECT id, short_code, ip, user_agent, referer, clicked_at
            FROM clicks
            WHERE short_code = $1
            ORDER BY clicked_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(short_code)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }
}
