//! Handler for the single registration endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::application::services::{Caller, RegistrationOutcome};
use crate::error::AppError;
use crate::state::AppState;

/// Registers one destination URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// {
///   "originalUrl": "https://example.com/page",
///   "prefix": "go-",
///   "alias": "docs",
///   "expirationDate": "2025-06-01T00:00:00Z"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "message": "Short URL created",
///   "shortenURL": "https://sho.rt/go-docs"
/// }
/// ```
///
/// # Response Codes
///
/// - **201 Created**: a new short code was allocated
/// - **200 OK**: the URL points at this service, or the owner already has it
/// - **4xx / 5xx**: see [`AppError`]
pub async fn shorten_handler(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let outcome = state.registration.register(caller, payload.into()).await?;

    let (status, message) = match &outcome {
        RegistrationOutcome::Created(_) => (StatusCode::CREATED, "Short URL created"),
        RegistrationOutcome::Existing(_) => (StatusCode::OK, "Short URL already exists"),
        RegistrationOutcome::SelfReferential(_) => {
            (StatusCode::OK, "URL already belongs to this service")
        }
    };

    Ok((
        status,
        Json(ShortenResponse {
            success: true,
            message: message.to_string(),
            shorten_url: Some(outcome.short_url(&state.base_url)),
            expires_at: outcome.record().and_then(|r| r.expires_at),
        }),
    ))
}
