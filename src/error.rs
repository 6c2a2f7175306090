//! Error taxonomy for registration, allocation and persistence.
//!
//! [`AppError`] is the tagged failure type returned by every service in the
//! crate. Callers match on variants instead of comparing messages; the HTTP
//! layer renders each variant with a stable machine code and structured
//! details via [`IntoResponse`].
//!
//! [`StoreError`] is the narrower error produced by repository
//! implementations. Its `DuplicateCode` variant is the signal the allocator
//! uses to retry with a fresh candidate.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

use crate::utils::db_error::is_unique_violation_on_code;

/// Errors raised by record and owner repositories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The short code is already present in the store (unique constraint).
    #[error("short code already stored: {0}")]
    DuplicateCode(String),

    #[error("record store failure: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

impl StoreError {
    /// Maps an insert failure, recognising the short-code unique constraint.
    pub fn from_insert(e: sqlx::Error, short_code: &str) -> Self {
        if is_unique_violation_on_code(&e) {
            return StoreError::DuplicateCode(short_code.to_string());
        }

        e.into()
    }
}

/// Failures surfaced to callers of the registration core.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Batch rejected: {} invalid URL(s)", invalid_urls.len())]
    InvalidBatch { invalid_urls: Vec<String> },

    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Code length must be between 1 and 32, got {0}")]
    InvalidLength(i64),

    #[error("Alias '{0}' is already in use")]
    AliasInUse(String),

    #[error("Expiration date must be in the future")]
    ExpiryInPast,

    #[error("Expiration date must not be later than {max}")]
    ExpiryTooFar { max: DateTime<Utc> },

    #[error("Quota exceeded: {remaining} remaining, {requested} requested")]
    QuotaExceeded { remaining: i64, requested: usize },

    #[error("Could not allocate a unique short code after {attempts} attempts")]
    AllocationExhausted { attempts: usize },

    #[error("Too many requests, retry after {reset_at}")]
    RateLimited { reset_at: DateTime<Utc> },

    #[error("Owner {0} does not exist")]
    UnknownOwner(i64),

    #[error("Secure random source unavailable: {0}")]
    Entropy(String),

    #[error("Record store failure: {0}")]
    StoreFailure(String),
}

impl AppError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Stable machine-readable identifier for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidUrl { .. } => "invalid_url",
            AppError::InvalidBatch { .. } => "invalid_batch",
            AppError::Validation { .. } => "validation_error",
            AppError::InvalidLength(_) => "invalid_length",
            AppError::AliasInUse(_) => "alias_in_use",
            AppError::ExpiryInPast => "expiry_in_past",
            AppError::ExpiryTooFar { .. } => "expiry_too_far",
            AppError::QuotaExceeded { .. } => "quota_exceeded",
            AppError::AllocationExhausted { .. } => "allocation_exhausted",
            AppError::RateLimited { .. } => "rate_limited",
            AppError::UnknownOwner(_) => "unknown_owner",
            AppError::Entropy(_) => "entropy_unavailable",
            AppError::StoreFailure(_) => "store_failure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidUrl { .. }
            | AppError::InvalidBatch { .. }
            | AppError::Validation { .. }
            | AppError::InvalidLength(_)
            | AppError::ExpiryInPast
            | AppError::ExpiryTooFar { .. } => StatusCode::BAD_REQUEST,
            AppError::AliasInUse(_) => StatusCode::CONFLICT,
            AppError::QuotaExceeded { .. } | AppError::UnknownOwner(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::AllocationExhausted { .. }
            | AppError::Entropy(_)
            | AppError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured context that lets a caller correct its input.
    pub fn details(&self) -> Value {
        match self {
            AppError::InvalidUrl { url, reason } => json!({ "url": url, "reason": reason }),
            AppError::InvalidBatch { invalid_urls } => json!({ "invalidUrls": invalid_urls }),
            AppError::Validation { field, reason } => json!({ "field": field, "reason": reason }),
            AppError::InvalidLength(length) => json!({ "field": "length", "provided": length }),
            AppError::AliasInUse(alias) => json!({ "alias": alias }),
            AppError::ExpiryInPast => json!({ "field": "expirationDate" }),
            AppError::ExpiryTooFar { max } => json!({ "field": "expirationDate", "max": max }),
            AppError::QuotaExceeded {
                remaining,
                requested,
            } => json!({ "remaining": remaining, "requested": requested }),
            AppError::AllocationExhausted { attempts } => json!({ "attempts": attempts }),
            AppError::RateLimited { reset_at } => json!({ "resetAt": reset_at }),
            AppError::UnknownOwner(id) => json!({ "ownerId": id }),
            AppError::Entropy(_) | AppError::StoreFailure(_) => json!({}),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateCode(code) => {
                AppError::StoreFailure(format!("unexpected duplicate short code: {code}"))
            }
            StoreError::Backend(message) => AppError::StoreFailure(message),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let first = errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errs)| {
                let reason = errs
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "failed validation".to_string());
                (field.to_string(), reason)
            });

        match first {
            Some((field, reason)) => AppError::Validation { field, reason },
            None => AppError::validation("request", errors.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
    error: &'static str,
    details: Value,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, code = self.code(), "Request failed");
        }

        let body = ErrorBody {
            success: false,
            message: self.to_string(),
            error: self.code(),
            details: self.details(),
        };

        (status, Json(body)).into_response()
    }
}
