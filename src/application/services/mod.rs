//! Business logic services for the application layer.

pub mod allocation;
pub mod expiration;
pub mod quota_service;
pub mod registration_service;

pub use allocation::CodeAllocator;
pub use expiration::{EntryPoint, ExpirationPolicy};
pub use quota_service::QuotaService;
pub use registration_service::{
    BulkItem, BulkOutcome, BulkRegistration, Caller, RegistrationOutcome, RegistrationService,
    RegistrationSettings, SingleRegistration,
};
