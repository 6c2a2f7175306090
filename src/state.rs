//! Shared application state injected into handlers.

use std::sync::Arc;

use crate::application::services::RegistrationService;
use crate::domain::rate_limit::RateLimiter;
use crate::domain::repositories::{OwnerRepository, ShortCodeRepository};

/// Registration service over type-erased store and limiter handles.
pub type DynRegistrationService =
    RegistrationService<dyn ShortCodeRepository, dyn OwnerRepository, dyn RateLimiter>;

#[derive(Clone)]
pub struct AppState {
    pub registration: Arc<DynRegistrationService>,
    /// Public origin short URLs are rendered under, without trailing slash.
    pub base_url: Arc<str>,
    /// Trust forwarded client IP headers.
    pub behind_proxy: bool,
}

impl AppState {
    pub fn new(
        records: Arc<dyn ShortCodeRepository>,
        owners: Arc<dyn OwnerRepository>,
        rate_limiter: Arc<dyn RateLimiter>,
        config: &crate::config::Config,
    ) -> Self {
        Self {
            registration: Arc::new(RegistrationService::new(
                records,
                owners,
                rate_limiter,
                config.registration_settings(),
            )),
            base_url: Arc::from(config.base_url.as_str()),
            behind_proxy: config.behind_proxy,
        }
    }
}
