//! Repository trait for owners and their quota counters.

use crate::domain::entities::{NewOwner, Owner};
use crate::error::StoreError;
use async_trait::async_trait;

/// Repository interface for owner records.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgOwnerRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryStore`] - process-local implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnerRepository: Send + Sync {
    /// Creates a new owner with `quota_used = 0`.
    async fn create(&self, new_owner: NewOwner) -> Result<Owner, StoreError>;

    /// Finds an owner by ID.
    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, StoreError>;

    /// Atomically adds `by` to the owner's `quota_used`.
    ///
    /// Must be a single store-level increment, never a read followed by a
    /// write. Returns the new `quota_used`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Backend`] if the owner does not exist or the
    /// store fails.
    async fn increment_quota(&self, id: i64, by: i64) -> Result<i64, StoreError>;

    /// Resets `quota_used` to zero for a new accounting period.
    ///
    /// Operator action only; the registration path never calls it.
    /// Returns `Ok(false)` if the owner does not exist.
    async fn reset_quota(&self, id: i64) -> Result<bool, StoreError>;
}
