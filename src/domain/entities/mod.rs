//! Core domain entities.
//!
//! Entities are plain data structures; business rules live in
//! [`crate::application::services`].
//!
//! - [`Owner`] - An account with quota counters and a subscription tier
//! - [`ShortCodeRecord`] - An allocated short code and its destination
//!
//! Creation uses separate input structs (`NewOwner`, `NewRecord`), and
//! [`RecordDraft`] carries a record through code allocation.

pub mod owner;
pub mod record;

pub use owner::{NewOwner, Owner, SubscriptionTier};
pub use record::{NewRecord, RecordDraft, ShortCodeRecord};
