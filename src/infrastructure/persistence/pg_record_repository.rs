//! PostgreSQL implementation of the short-code repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewRecord, ShortCodeRecord};
use crate::domain::repositories::ShortCodeRepository;
use crate::error::StoreError;

/// PostgreSQL repository for short-code records.
///
/// Uniqueness of `short_code` is enforced by the `short_codes_short_code_key`
/// constraint; a violation on insert surfaces as [`StoreError::DuplicateCode`].
pub struct PgRecordRepository {
    pool: Arc<PgPool>,
}

impl PgRecordRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RecordRow {
    id: i64,
    original_url: String,
    short_code: String,
    owner_id: Option<i64>,
    clicks: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<RecordRow> for ShortCodeRecord {
    fn from(r: RecordRow) -> Self {
        ShortCodeRecord::new(
            r.id,
            r.original_url,
            r.short_code,
            r.owner_id,
            r.clicks,
            r.created_at,
            r.expires_at,
        )
    }
}

#[async_trait]
impl ShortCodeRepository for PgRecordRepository {
    async fn insert(&self, new_record: NewRecord) -> Result<ShortCodeRecord, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            INSERT INTO short_codes (original_url, short_code, owner_id, clicks, created_at, expires_at)
            VALUES ($1, $2, $3, 0, $4, $5)
            RETURNING id, original_url, short_code, owner_id, clicks, created_at, expires_at
            "#,
        )
        .bind(&new_record.original_url)
        .bind(&new_record.short_code)
        .bind(new_record.owner_id)
        .bind(new_record.created_at)
        .bind(new_record.expires_at)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| StoreError::from_insert(e, &new_record.short_code))?;

        Ok(row.into())
    }

    async fn code_exists(&self, code: &str) -> Result<bool, StoreError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM short_codes WHERE short_code = $1)")
                .bind(code)
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(exists)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortCodeRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, original_url, short_code, owner_id, clicks, created_at, expires_at
            FROM short_codes
            WHERE short_code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortCodeRecord>, StoreError> {
        let row = sqlx::query_as::<_, RecordRow>(
            r#"
            SELECT id, original_url, short_code, owner_id, clicks, created_at, expires_at
            FROM short_codes
            WHERE owner_id = $1
              AND original_url = $2
              AND (expires_at IS NULL OR expires_at > NOW())
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(owner_id)
        .bind(original_url)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM short_codes WHERE short_code = $1")
            .bind(code)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Record store health check failed"))
            .is_ok()
    }
}
