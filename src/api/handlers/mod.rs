//! HTTP request handlers for API endpoints.

pub mod bulk;
pub mod health;
pub mod shorten;

pub use bulk::bulk_shorten_handler;
pub use health::health_handler;
pub use shorten::shorten_handler;
