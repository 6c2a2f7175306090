//! Per-owner quota admission and consumption.

use std::sync::Arc;

use crate::domain::entities::Owner;
use crate::domain::repositories::OwnerRepository;
use crate::error::AppError;

/// Service for owner quota checks and accounting.
///
/// Admission checks are advisory: they fail fast before any generation work.
/// The atomic increment in [`QuotaService::record`] is the source of truth
/// for consumption.
pub struct QuotaService<O: ?Sized> {
    owners: Arc<O>,
}

impl<O: OwnerRepository + ?Sized> QuotaService<O> {
    /// Creates a new quota service.
    pub fn new(owners: Arc<O>) -> Self {
        Self { owners }
    }

    /// Loads the owner a request is attributed to.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::UnknownOwner`] if no such owner exists.
    pub async fn load_owner(&self, owner_id: i64) -> Result<Owner, AppError> {
        self.owners
            .find_by_id(owner_id)
            .await?
            .ok_or(AppError::UnknownOwner(owner_id))
    }

    /// Returns true if the owner may register one more code.
    pub fn admit(&self, owner: &Owner) -> bool {
        owner.tier.is_unlimited() || owner.quota_used < owner.quota_limit
    }

    /// Returns true if the owner's remaining quota covers `batch_size` codes.
    pub fn admit_batch(&self, owner: &Owner, batch_size: usize) -> bool {
        owner.tier.is_unlimited() || owner.remaining_quota() >= batch_size as i64
    }

    /// Records `count` successful registrations for the owner.
    ///
    /// Returns the new `quota_used`, or `None` when `count` is zero and no
    /// write was made.
    pub async fn record(&self, owner_id: i64, count: usize) -> Result<Option<i64>, AppError> {
        if count == 0 {
            return Ok(None);
        }

        let used = self
            .owners
            .increment_quota(owner_id, count as i64)
            .await
            .inspect_err(|e| {
                tracing::error!(owner_id, count, error = %e, "Failed to record quota consumption");
            })?;

        tracing::debug!(owner_id, count, quota_used = used, "Quota consumed");
        Ok(Some(used))
    }
}
