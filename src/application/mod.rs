//! Application layer services implementing the registration core.
//!
//! Services consume the repository and rate-limiter traits from
//! [`crate::domain`] and expose tagged outcomes to the HTTP layer.
//!
//! # Available Services
//!
//! - [`services::registration_service::RegistrationService`] - Single and bulk registration
//! - [`services::allocation::CodeAllocator`] - Unique short-code allocation
//! - [`services::quota_service::QuotaService`] - Owner quota admission and accounting
//! - [`services::expiration::ExpirationPolicy`] - Expiry defaults and caps

pub mod services;
