//! DTOs for the bulk registration endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{BulkItem, BulkRegistration};

/// Request to shorten a list of URLs under one prefix and length.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkShortenRequest {
    #[validate(length(
        min = 1,
        max = 1000,
        message = "urlList must contain between 1 and 1000 URLs"
    ))]
    pub url_list: Vec<String>,

    pub prefix: Option<String>,

    pub length: Option<i64>,

    pub expiration_date: Option<DateTime<Utc>>,
}

impl From<BulkShortenRequest> for BulkRegistration {
    fn from(req: BulkShortenRequest) -> Self {
        BulkRegistration {
            urls: req.url_list,
            prefix: req.prefix,
            length: req.length,
            expires_at: req.expiration_date,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkShortenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub invalid_urls: Option<Vec<String>>,

    #[serde(rename = "shortenedURLs", skip_serializing_if = "Option::is_none")]
    pub shortened_urls: Option<Vec<ShortenedUrl>>,
}

/// One processed entry of a batch, in submission order.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedUrl {
    pub original: String,
    pub shortened: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenedUrl {
    pub fn from_item(item: BulkItem, base_url: &str) -> Self {
        let shortened = item.outcome.short_url(base_url);
        let record = item.outcome.record();

        Self {
            created_at: record.map(|r| r.created_at),
            expires_at: record.and_then(|r| r.expires_at),
            original: item.original,
            shortened,
        }
    }
}
