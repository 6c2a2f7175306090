//! Domain layer containing business entities and contracts.
//!
//! - [`entities`] - Owners and short-code records
//! - [`repositories`] - Data access trait definitions
//! - [`rate_limit`] - Anonymous rate limiter contract
//!
//! The domain layer has no dependencies on infrastructure or presentation
//! layers; business logic lives in [`crate::application::services`].

pub mod entities;
pub mod rate_limit;
pub mod repositories;
