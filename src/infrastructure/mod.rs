//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`persistence`] - PostgreSQL and in-memory record stores
//! - [`rate_limit`] - IP rate limiter for anonymous callers

pub mod persistence;
pub mod rate_limit;
