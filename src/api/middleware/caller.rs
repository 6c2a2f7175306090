//! Caller identity extraction.
//!
//! Authentication happens upstream: the gateway forwards the resolved owner
//! id in `X-Owner-Id`. A request without the header is anonymous and is
//! rate-limited by client IP instead of charged to a quota.

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use std::net::SocketAddr;

use crate::application::services::Caller;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::extract_client_ip;

pub const OWNER_ID_HEADER: &str = "x-owner-id";

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let owner_id = match parts.headers.get(OWNER_ID_HEADER) {
            None => None,
            Some(value) => Some(
                value
                    .to_str()
                    .ok()
                    .and_then(|v| v.trim().parse::<i64>().ok())
                    .ok_or_else(|| AppError::validation("X-Owner-Id", "must be an integer owner id"))?,
            ),
        };

        // Absent when the router is not served with connect info, as in tests.
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        Ok(Caller {
            owner_id,
            ip: extract_client_ip(&parts.headers, peer, state.behind_proxy),
        })
    }
}
