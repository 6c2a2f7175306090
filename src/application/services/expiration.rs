//! Expiry defaults and caps per caller tier and entry point.
//!
//! Single registrations and bulk batches use different windows: a single
//! registration defaults to six months for anonymous and free callers, while
//! a bulk batch defaults to 90 days for everyone.

use chrono::{DateTime, Duration, Months, Utc};

use crate::domain::entities::SubscriptionTier;
use crate::error::AppError;

pub const SINGLE_WINDOW_MONTHS: u32 = 6;
pub const BULK_WINDOW_DAYS: i64 = 90;

/// Which registration operation an expiry is resolved for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryPoint {
    Single,
    Bulk,
}

pub struct ExpirationPolicy;

impl ExpirationPolicy {
    /// Resolves the effective expiry for a registration made at `now`.
    ///
    /// `tier` is `None` for anonymous callers. Returns `Ok(None)` when the
    /// record never expires.
    ///
    /// # Errors
    ///
    /// - [`AppError::ExpiryInPast`] if `requested` is not after `now`
    /// - [`AppError::ExpiryTooFar`] if `requested` is later than the cap
    pub fn resolve(
        requested: Option<DateTime<Utc>>,
        tier: Option<SubscriptionTier>,
        entry_point: EntryPoint,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, AppError> {
        let cap = Self::cap(tier, entry_point, now);

        let Some(requested) = requested else {
            return Ok(Self::default_expiry(tier, entry_point, now));
        };

        if requested <= now {
            return Err(AppError::ExpiryInPast);
        }

        if let Some(max) = cap
            && requested > max
        {
            return Err(AppError::ExpiryTooFar { max });
        }

        Ok(Some(requested))
    }

    fn default_expiry(
        tier: Option<SubscriptionTier>,
        entry_point: EntryPoint,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match entry_point {
            EntryPoint::Single if is_restricted(tier) => Some(six_months_after(now)),
            EntryPoint::Single => None,
            EntryPoint::Bulk => Some(now + Duration::days(BULK_WINDOW_DAYS)),
        }
    }

    fn cap(
        tier: Option<SubscriptionTier>,
        entry_point: EntryPoint,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        match (entry_point, tier) {
            (EntryPoint::Bulk, None) => Some(now + Duration::days(BULK_WINDOW_DAYS)),
            (_, tier) if is_restricted(tier) => Some(six_months_after(now)),
            _ => None,
        }
    }
}

/// Anonymous and free-tier callers are subject to expiry caps.
fn is_restricted(tier: Option<SubscriptionTier>) -> bool {
    tier.is_none_or(SubscriptionTier::is_free)
}

fn six_months_after(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(SINGLE_WINDOW_MONTHS))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0).unwrap()
    }

    fn july_15() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 7, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_single_defaults() {
        let anon = ExpirationPolicy::resolve(None, None, EntryPoint::Single, now()).unwrap();
        assert_eq!(anon, Some(july_15()));

        let free = ExpirationPolicy::resolve(
            None,
            Some(SubscriptionTier::Free),
            EntryPoint::Single,
            now(),
        )
        .unwrap();
        assert_eq!(free, Some(july_15()));

        for tier in [
            SubscriptionTier::Basic,
            SubscriptionTier::Premium,
            SubscriptionTier::Enterprise,
        ] {
            let paid =
                ExpirationPolicy::resolve(None, Some(tier), EntryPoint::Single, now()).unwrap();
            assert_eq!(paid, None, "{tier}");
        }
    }

    #[test]
    fn test_bulk_default_is_ninety_days_for_everyone() {
        for tier in [None, Some(SubscriptionTier::Free), Some(SubscriptionTier::Premium)] {
            let expiry = ExpirationPolicy::resolve(None, tier, EntryPoint::Bulk, now()).unwrap();
            assert_eq!(expiry, Some(now() + Duration::days(90)));
        }
    }

    #[test]
    fn test_past_expiry_rejected_for_every_tier() {
        let yesterday = now() - Duration::days(1);
        for tier in [None, Some(SubscriptionTier::Free), Some(SubscriptionTier::Enterprise)] {
            for entry in [EntryPoint::Single, EntryPoint::Bulk] {
                let err = ExpirationPolicy::resolve(Some(yesterday), tier, entry, now()).unwrap_err();
                assert!(matches!(err, AppError::ExpiryInPast));
            }
        }

        let err = ExpirationPolicy::resolve(Some(now()), None, EntryPoint::Single, now())
            .unwrap_err();
        assert!(matches!(err, AppError::ExpiryInPast));
    }

    #[test]
    fn test_single_cap_for_free_and_anonymous() {
        let too_far = july_15() + Duration::seconds(1);
        for tier in [None, Some(SubscriptionTier::Free)] {
            let err = ExpirationPolicy::resolve(Some(too_far), tier, EntryPoint::Single, now())
                .unwrap_err();
            assert!(matches!(err, AppError::ExpiryTooFar { max } if max == july_15()));
        }

        let exact = ExpirationPolicy::resolve(Some(july_15()), None, EntryPoint::Single, now());
        assert_eq!(exact.unwrap(), Some(july_15()));
    }

    #[test]
    fn test_paid_tiers_are_uncapped() {
        let far = now() + Duration::days(3650);
        for entry in [EntryPoint::Single, EntryPoint::Bulk] {
            let expiry =
                ExpirationPolicy::resolve(Some(far), Some(SubscriptionTier::Basic), entry, now());
            assert_eq!(expiry.unwrap(), Some(far));
        }
    }

    #[test]
    fn test_bulk_caps_differ_between_anonymous_and_free() {
        let hundred_days = now() + Duration::days(100);

        let err = ExpirationPolicy::resolve(Some(hundred_days), None, EntryPoint::Bulk, now())
            .unwrap_err();
        assert!(matches!(err, AppError::ExpiryTooFar { max } if max == now() + Duration::days(90)));

        let free = ExpirationPolicy::resolve(
            Some(hundred_days),
            Some(SubscriptionTier::Free),
            EntryPoint::Bulk,
            now(),
        );
        assert_eq!(free.unwrap(), Some(hundred_days));
    }
}
