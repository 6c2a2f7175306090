//! Repository trait for short-code records.

use crate::domain::entities::{NewRecord, ShortCodeRecord};
use crate::error::StoreError;
use async_trait::async_trait;

/// Repository interface for the global short-code namespace.
///
/// Short codes are unique across the whole store, regardless of owner.
/// Implementations must enforce that uniqueness at the storage level so that
/// concurrent writers cannot both insert the same code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgRecordRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShortCodeRepository: Send + Sync {
    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateCode`] if the short code is already stored.
    /// Returns [`StoreError::Backend`] on storage errors.
    async fn insert(&self, new_record: NewRecord) -> Result<ShortCodeRecord, StoreError>;

    /// Checks whether a short code is already allocated.
    ///
    /// Expired records that have not been purged still occupy their code.
    async fn code_exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Finds a record by its short code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortCodeRecord>, StoreError>;

    /// Finds a non-expired record created by `owner_id` for `original_url`.
    ///
    /// Used to make registration idempotent per (owner, destination).
    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortCodeRecord>, StoreError>;

    /// Deletes a record by its short code.
    ///
    /// Returns `Ok(true)` if a record was removed, `Ok(false)` if none matched.
    async fn delete(&self, code: &str) -> Result<bool, StoreError>;

    /// Returns true if the backing store is reachable.
    async fn health_check(&self) -> bool;
}
