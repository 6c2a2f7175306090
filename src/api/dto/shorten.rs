//! DTOs for the single registration endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::SingleRegistration;
use crate::utils::alias::CodeRequest;

/// Request to shorten one URL.
///
/// `alias` takes precedence over `length`; `prefix` is prepended to either.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[validate(length(min = 1, message = "originalUrl is required"))]
    pub original_url: String,

    pub alias: Option<String>,

    pub prefix: Option<String>,

    /// Generated segment length, 1 to 32.
    pub length: Option<i64>,

    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<ShortenRequest> for SingleRegistration {
    fn from(req: ShortenRequest) -> Self {
        SingleRegistration {
            original_url: req.original_url,
            code: CodeRequest {
                prefix: req.prefix,
                alias: req.alias,
                length: req.length,
            },
            expires_at: req.expiration_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub success: bool,
    pub message: String,

    #[serde(rename = "shortenURL", skip_serializing_if = "Option::is_none")]
    pub shorten_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}
