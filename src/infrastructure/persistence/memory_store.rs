//! Process-local record and owner store.
//!
//! Backs both repository traits with sharded [`DashMap`]s. Code uniqueness is
//! enforced with the map's entry API, so two concurrent inserts of the same
//! code cannot both succeed. State is lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewOwner, NewRecord, Owner, ShortCodeRecord};
use crate::domain::repositories::{OwnerRepository, ShortCodeRepository};
use crate::error::StoreError;

/// In-memory implementation of [`ShortCodeRepository`] and [`OwnerRepository`].
#[derive(Debug)]
pub struct InMemoryStore {
    records: DashMap<String, ShortCodeRecord>,
    owners: DashMap<i64, Owner>,
    next_record_id: AtomicI64,
    next_owner_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            owners: DashMap::new(),
            next_record_id: AtomicI64::new(1),
            next_owner_id: AtomicI64::new(1),
        }
    }

    /// Number of stored records, expired ones included.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShortCodeRepository for InMemoryStore {
    async fn insert(&self, new_record: NewRecord) -> Result<ShortCodeRecord, StoreError> {
        match self.records.entry(new_record.short_code.clone()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateCode(new_record.short_code)),
            Entry::Vacant(slot) => {
                let record = ShortCodeRecord::new(
                    self.next_record_id.fetch_add(1, Ordering::Relaxed),
                    new_record.original_url,
                    new_record.short_code,
                    new_record.owner_id,
                    0,
                    new_record.created_at,
                    new_record.expires_at,
                );
                slot.insert(record.clone());
                Ok(record)
            }
        }
    }

    async fn code_exists(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.records.contains_key(code))
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortCodeRecord>, StoreError> {
        Ok(self.records.get(code).map(|r| r.value().clone()))
    }

    async fn find_by_owner_and_url(
        &self,
        owner_id: i64,
        original_url: &str,
    ) -> Result<Option<ShortCodeRecord>, StoreError> {
        // Full scan; acceptable for a process-local store.
        let found = self
            .records
            .iter()
            .filter(|r| {
                r.owner_id == Some(owner_id) && r.original_url == original_url && !r.is_expired()
            })
            .max_by_key(|r| r.created_at)
            .map(|r| r.value().clone());

        Ok(found)
    }

    async fn delete(&self, code: &str) -> Result<bool, StoreError> {
        Ok(self.records.remove(code).is_some())
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[async_trait]
impl OwnerRepository for InMemoryStore {
    async fn create(&self, new_owner: NewOwner) -> Result<Owner, StoreError> {
        let owner = Owner::new(
            self.next_owner_id.fetch_add(1, Ordering::Relaxed),
            new_owner.tier,
            0,
            new_owner.quota_limit,
            Utc::now(),
        );
        self.owners.insert(owner.id, owner.clone());
        Ok(owner)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Owner>, StoreError> {
        Ok(self.owners.get(&id).map(|o| o.value().clone()))
    }

    async fn increment_quota(&self, id: i64, by: i64) -> Result<i64, StoreError> {
        let mut owner = self
            .owners
            .get_mut(&id)
            .ok_or_else(|| StoreError::Backend(format!("owner {id} not found")))?;

        owner.quota_used = owner.quota_used.saturating_add(by);
        Ok(owner.quota_used)
    }

    async fn reset_quota(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self
            .owners
            .get_mut(&id)
            .map(|mut owner| owner.quota_used = 0)
            .is_some())
    }
}
