//! Handler for the bulk registration endpoint.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::api::dto::bulk::{BulkShortenRequest, BulkShortenResponse, ShortenedUrl};
use crate::application::services::Caller;
use crate::error::AppError;
use crate::state::AppState;

/// Registers up to 1000 destination URLs in one request.
///
/// # Endpoint
///
/// `POST /api/shorten/bulk`
///
/// # Partial Failure
///
/// The batch is validated as a whole first: one invalid URL rejects it with
/// `invalidUrls` and nothing is written. If the store fails midway, the
/// response carries the status of that failure together with every URL
/// processed before it; those records remain valid.
///
/// # Response
///
/// ```json
/// {
///   "shortenedURLs": [
///     {
///       "original": "https://example.com",
///       "shortened": "https://sho.rt/q-Ab3dE9",
///       "createdAt": "2025-01-15T12:00:00Z",
///       "expiresAt": "2025-04-15T12:00:00Z"
///     }
///   ]
/// }
/// ```
pub async fn bulk_shorten_handler(
    State(state): State<AppState>,
    caller: Caller,
    Json(payload): Json<BulkShortenRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let outcome = match state
        .registration
        .register_bulk(caller, payload.into())
        .await
    {
        Ok(outcome) => outcome,
        Err(AppError::InvalidBatch { invalid_urls }) => {
            let body = BulkShortenResponse {
                error: Some(format!("{} invalid URL(s) in batch", invalid_urls.len())),
                invalid_urls: Some(invalid_urls),
                shortened_urls: None,
            };
            return Ok((StatusCode::BAD_REQUEST, Json(body)).into_response());
        }
        Err(e) => return Err(e),
    };

    let status = match &outcome.failure {
        Some(e) => e.status(),
        None if outcome.created > 0 => StatusCode::CREATED,
        None => StatusCode::OK,
    };

    let shortened_urls = outcome
        .items
        .into_iter()
        .map(|item| ShortenedUrl::from_item(item, &state.base_url))
        .collect();

    let body = BulkShortenResponse {
        error: outcome.failure.map(|e| e.to_string()),
        invalid_urls: None,
        shortened_urls: Some(shortened_urls),
    };

    Ok((status, Json(body)).into_response())
}
