//! Repository trait definitions for the domain layer.
//!
//! Traits define the data-access contract; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated
//! via `mockall` for unit tests.
//!
//! - [`ShortCodeRepository`] - Short-code records (global namespace)
//! - [`OwnerRepository`] - Owners and atomic quota counters

pub mod owner_repository;
pub mod record_repository;

pub use owner_repository::OwnerRepository;
pub use record_repository::ShortCodeRepository;

#[cfg(test)]
pub use owner_repository::MockOwnerRepository;
#[cfg(test)]
pub use record_repository::MockShortCodeRepository;
