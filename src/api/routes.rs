//! API route configuration.
//!
//! Authentication is performed by the upstream gateway; see
//! [`crate::api::middleware::caller`].

use crate::api::handlers::{bulk_shorten_handler, shorten_handler};
use crate::state::AppState;
use axum::{Router, routing::post};

/// Registration routes, nested under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`      - Register one URL
/// - `POST /shorten/bulk` - Register up to 1000 URLs
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/shorten/bulk", post(bulk_shorten_handler))
}
