//! Utility functions for code generation, input validation, and request handling.
//!
//! - [`code_generator`] - Cryptographically secure short code generation
//! - [`alias`] - Prefix/alias composition and validation
//! - [`url_validator`] - Destination URL validation and own-domain detection
//! - [`client_ip`] - Client IP extraction from request metadata
//! - [`db_error`] - Database error classification

pub mod alias;
pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod url_validator;
