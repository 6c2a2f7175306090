//! HTTP middleware and extractors.
//!
//! - [`caller`] - Owner id and client IP extraction
//! - [`tracing`] - Request/response logging

pub mod caller;
pub mod tracing;
