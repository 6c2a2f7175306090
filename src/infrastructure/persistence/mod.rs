//! Record store implementations.
//!
//! # Repositories
//!
//! - [`PgRecordRepository`] - PostgreSQL short-code records
//! - [`PgOwnerRepository`] - PostgreSQL owners and quota counters
//! - [`InMemoryStore`] - process-local store implementing both traits

pub mod memory_store;
pub mod pg_owner_repository;
pub mod pg_record_repository;

pub use memory_store::InMemoryStore;
pub use pg_owner_repository::PgOwnerRepository;
pub use pg_record_repository::PgRecordRepository;
