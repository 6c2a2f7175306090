//! Short-code record: one allocated code → destination mapping.

use chrono::{DateTime, Utc};

/// A persisted short code with its destination.
///
/// `owner_id` is `None` for anonymous registrations. `clicks` is written
/// only by the redirect subsystem and is always 0 on creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortCodeRecord {
    pub id: i64,
    pub original_url: String,
    pub short_code: String,
    pub owner_id: Option<i64>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortCodeRecord {
    /// Creates a new ShortCodeRecord instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        original_url: String,
        short_code: String,
        owner_id: Option<i64>,
        clicks: i64,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id,
            original_url,
            short_code,
            owner_id,
            clicks,
            created_at,
            expires_at,
        }
    }

    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }

    /// Fully-qualified short URL under `base_url`.
    pub fn short_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.short_code)
    }
}

/// Input data for inserting a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub original_url: String,
    pub short_code: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// A record awaiting its short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDraft {
    pub original_url: String,
    pub owner_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RecordDraft {
    pub fn with_code(&self, short_code: String) -> NewRecord {
        NewRecord {
            original_url: self.original_url.clone(),
            short_code,
            owner_id: self.owner_id,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
