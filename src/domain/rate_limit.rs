//! Rate limiter contract for anonymous callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::net::IpAddr;

/// Result of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    /// Requests still available in the current window.
    pub remaining: u32,
    /// When the limiter will next admit a request at full capacity.
    pub reset_at: DateTime<Utc>,
}

/// IP-keyed limiter consulted before admitting anonymous registrations.
///
/// Each call to [`RateLimiter::check_limit`] consumes one unit when allowed.
/// The limiter may be an external service, hence the async contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    async fn check_limit(&self, ip: IpAddr) -> RateLimitDecision;
}
