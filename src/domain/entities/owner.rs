//! Owner entity: the account that registrations are charged to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subscription tier of an owner.
///
/// Only the flag is read here; billing state lives elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    Free,
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionTier {
    /// Tiers that bypass the quota ceiling.
    pub fn is_unlimited(self) -> bool {
        matches!(self, SubscriptionTier::Premium | SubscriptionTier::Enterprise)
    }

    /// Paid tiers are exempt from the free-tier expiry caps.
    pub fn is_free(self) -> bool {
        self == SubscriptionTier::Free
    }

    /// Quota ceiling given to newly created owners of this tier.
    pub fn default_quota_limit(self) -> i64 {
        match self {
            SubscriptionTier::Free => 50,
            SubscriptionTier::Basic => 500,
            SubscriptionTier::Premium | SubscriptionTier::Enterprise => i64::MAX,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionTier::Free => "free",
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "free" => Ok(SubscriptionTier::Free),
            "basic" => Ok(SubscriptionTier::Basic),
            "premium" => Ok(SubscriptionTier::Premium),
            "enterprise" => Ok(SubscriptionTier::Enterprise),
            other => Err(format!("unknown subscription tier '{other}'")),
        }
    }
}

/// An account with usage counters for the current accounting period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Owner {
    pub id: i64,
    pub tier: SubscriptionTier,
    pub quota_used: i64,
    pub quota_limit: i64,
    pub created_at: DateTime<Utc>,
}

impl Owner {
    pub fn new(
        id: i64,
        tier: SubscriptionTier,
        quota_used: i64,
        quota_limit: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            tier,
            quota_used,
            quota_limit,
            created_at,
        }
    }

    /// Registrations still available in the current period, never negative.
    pub fn remaining_quota(&self) -> i64 {
        self.quota_limit.saturating_sub(self.quota_used).max(0)
    }
}

/// Input data for creating an owner.
#[derive(Debug, Clone)]
pub struct NewOwner {
    pub tier: SubscriptionTier,
    pub quota_limit: i64,
}

impl NewOwner {
    /// An owner with the tier's default quota ceiling.
    pub fn with_tier(tier: SubscriptionTier) -> Self {
        Self {
            tier,
            quota_limit: tier.default_quota_limit(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_tiers() {
        assert!(!SubscriptionTier::Free.is_unlimited());
        assert!(!SubscriptionTier::Basic.is_unlimited());
        assert!(SubscriptionTier::Premium.is_unlimited());
        assert!(SubscriptionTier::Enterprise.is_unlimited());
    }

    #[test]
    fn test_tier_parse_roundtrip() {
        for tier in [
            SubscriptionTier::Free,
            SubscriptionTier::Basic,
            SubscriptionTier::Premium,
            SubscriptionTier::Enterprise,
        ] {
            assert_eq!(tier.as_str().parse::<SubscriptionTier>().unwrap(), tier);
        }
        assert_eq!(
            "PREMIUM".parse::<SubscriptionTier>().unwrap(),
            SubscriptionTier::Premium
        );
        assert!("gold".parse::<SubscriptionTier>().is_err());
    }

    #[test]
    fn test_remaining_quota() {
        let owner = Owner::new(1, SubscriptionTier::Free, 8, 10, Utc::now());
        assert_eq!(owner.remaining_quota(), 2);

        let over = Owner::new(1, SubscriptionTier::Free, 12, 10, Utc::now());
        assert_eq!(over.remaining_quota(), 0);
    }

    #[test]
    fn test_new_owner_uses_tier_default() {
        let new_owner = NewOwner::with_tier(SubscriptionTier::Basic);
        assert_eq!(new_owner.quota_limit, 500);
    }
}
