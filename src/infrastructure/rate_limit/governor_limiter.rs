//! GCRA rate limiter keyed by client IP.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use governor::clock::{Clock, DefaultClock};
use governor::middleware::StateInformationMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter as Governor};
use std::net::IpAddr;
use std::num::NonZeroU32;
use std::time::Duration;

use crate::domain::rate_limit::{RateLimitDecision, RateLimiter};

type KeyedLimiter =
    Governor<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock, StateInformationMiddleware>;

/// Process-local [`RateLimiter`] backed by `governor`.
///
/// Each IP gets a bucket of `burst` requests that refills at `per_minute`.
/// Keys accumulate until [`GovernorRateLimiter::retain_recent`] is called.
pub struct GovernorRateLimiter {
    limiter: KeyedLimiter,
    quota: Quota,
}

impl GovernorRateLimiter {
    pub fn new(per_minute: NonZeroU32, burst: NonZeroU32) -> Self {
        let quota = Quota::per_minute(per_minute).allow_burst(burst);
        let limiter = Governor::keyed(quota).with_middleware::<StateInformationMiddleware>();

        Self { limiter, quota }
    }

    /// Drops buckets that have fully refilled.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of tracked client IPs.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    fn refill_time(&self, remaining: u32) -> Duration {
        let missing = self.quota.burst_size().get().saturating_sub(remaining);
        self.quota.replenish_interval() * missing
    }
}

#[async_trait]
impl RateLimiter for GovernorRateLimiter {
    async fn check_limit(&self, ip: IpAddr) -> RateLimitDecision {
        let now = Utc::now();

        match self.limiter.check_key(&ip) {
            Ok(snapshot) => {
                let remaining = snapshot.remaining_burst_capacity();
                RateLimitDecision {
                    allowed: true,
                    remaining,
                    reset_at: after(now, self.refill_time(remaining)),
                }
            }
            Err(not_until) => {
                let wait = not_until.wait_time_from(DefaultClock::default().now());
                RateLimitDecision {
                    allowed: false,
                    remaining: 0,
                    reset_at: after(now, wait),
                }
            }
        }
    }
}

fn after(now: DateTime<Utc>, wait: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(wait)
        .ok()
        .and_then(|d| now.checked_add_signed(d))
        .unwrap_or(now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn nz(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(198, 51, 100, last))
    }

    #[tokio::test]
    async fn test_burst_then_denied() {
        let limiter = GovernorRateLimiter::new(nz(1), nz(3));

        for expected_remaining in [2, 1, 0] {
            let decision = limiter.check_limit(ip(1)).await;
            assert!(decision.allowed);
            assert_eq!(decision.remaining, expected_remaining);
        }

        let denied = limiter.check_limit(ip(1)).await;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.reset_at > Utc::now());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = GovernorRateLimiter::new(nz(1), nz(1));

        assert!(limiter.check_limit(ip(1)).await.allowed);
        assert!(!limiter.check_limit(ip(1)).await.allowed);
        assert!(limiter.check_limit(ip(2)).await.allowed);
        assert_eq!(limiter.tracked_keys(), 2);
    }

    #[test]
    fn test_refill_time_scales_with_missing_capacity() {
        let limiter = GovernorRateLimiter::new(nz(60), nz(10));
        assert_eq!(limiter.refill_time(10), Duration::ZERO);
        assert_eq!(limiter.refill_time(7), Duration::from_secs(3));
    }
}
