//! PostgreSQL implementation of the owner repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewOwner, Owner, SubscriptionTier};
use crate::domain::repositories::OwnerRepository;
use crate::error::StoreError;

/// PostgreSQL repository for owners and quota counters.
pub struct PgOwnerRepository {
    pool: Arc<PgPool>,
}

impl PgOwnerRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct OwnerRow {
    id: i64,
    subscription_tier: String,
    quota_used: i64,
    quota_limit: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<OwnerRow> for Owner {
    type Error = StoreError;

    fn try_from(r: OwnerRow) -> Result<Self, Self::Error> {
        let tier: SubscriptionTier = r.subscription_tier.parse().map_err(StoreError::Backend)?;
        Ok(Owner::new(r.id, tier, r.quota_used, r.quota_limit, r.created_at))
    }
}

#[async_trait]
impl OwnerRepository for PgOwnerRepository {
    async fn create(&self, new_owner: NewOwner) -> Result<Owner, StoreError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            INSERT INTO owners (subscription_tier, quota_used, quota_limit)
            VALUES ($1, 0, $2)
            RETURNING id, subscription_tier, quota_used, quota_limit, created_at
            "#,
        )
        .bind(new_owner.tier.as_str())
        .bind(new_owner.quota_limit)
        .fetch_one(self.pool.as_ref())
        .await?;

        row.try_into()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, StoreError> {
        let row = sqlx::query_as::<_, OwnerRow>(
            r#"
            SELECT id, subscription_tier, quota_used, quota_limit, created_at
            FROM owners
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(Owner::try_from).transpose()
    }

    async fn increment_quota(&self, id: i64, by: i64) -> Result<i64, StoreError> {
        let used: Option<i64> = sqlx::query_scalar(
            "UPDATE owners SET quota_used = quota_used + $2 WHERE id = $1 RETURNING quota_used",
        )
        .bind(id)
        .bind(by)
        .fetch_optional(self.pool.as_ref())
        .await?;

        used.ok_or_else(|| StoreError::Backend(format!("owner {id} not found")))
    }

    async fn reset_quota(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE owners SET quota_used = 0 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
