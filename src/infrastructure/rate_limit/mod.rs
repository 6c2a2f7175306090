//! Rate limiter implementations.

pub mod governor_limiter;

pub use governor_limiter::GovernorRateLimiter;
