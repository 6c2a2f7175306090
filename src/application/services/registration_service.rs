//! Single and bulk registration of destination URLs.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::allocation::CodeAllocator;
use super::expiration::{EntryPoint, ExpirationPolicy};
use super::quota_service::QuotaService;
use crate::domain::entities::{Owner, RecordDraft, ShortCodeRecord};
use crate::domain::rate_limit::RateLimiter;
use crate::domain::repositories::{OwnerRepository, ShortCodeRepository};
use crate::error::AppError;
use crate::utils::alias::{AliasRules, Candidate, CodeRequest, compose};
use crate::utils::url_validator::{is_self_referential, validate_destination};

/// Largest batch accepted by [`RegistrationService::register_bulk`].
pub const MAX_BULK_URLS: usize = 1000;

/// Who a registration is made by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Caller {
    /// `None` for anonymous callers.
    pub owner_id: Option<i64>,
    /// Used to rate-limit anonymous callers.
    pub ip: Option<IpAddr>,
}

impl Caller {
    pub fn anonymous(ip: Option<IpAddr>) -> Self {
        Self { owner_id: None, ip }
    }

    pub fn owner(owner_id: i64) -> Self {
        Self {
            owner_id: Some(owner_id),
            ip: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SingleRegistration {
    pub original_url: String,
    pub code: CodeRequest,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct BulkRegistration {
    pub urls: Vec<String>,
    pub prefix: Option<String>,
    pub length: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of registering one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// A new record was inserted and one unit of quota consumed.
    Created(ShortCodeRecord),
    /// The owner already holds a live record for this destination.
    Existing(ShortCodeRecord),
    /// The destination points at the service itself and is returned as is.
    SelfReferential(String),
}

impl RegistrationOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, RegistrationOutcome::Created(_))
    }

    pub fn record(&self) -> Option<&ShortCodeRecord> {
        match self {
            RegistrationOutcome::Created(record) | RegistrationOutcome::Existing(record) => {
                Some(record)
            }
            RegistrationOutcome::SelfReferential(_) => None,
        }
    }

    /// The URL handed back to the caller.
    pub fn short_url(&self, base_url: &str) -> String {
        match self {
            RegistrationOutcome::Created(record) | RegistrationOutcome::Existing(record) => {
                record.short_url(base_url)
            }
            RegistrationOutcome::SelfReferential(url) => url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    pub original: String,
    pub outcome: RegistrationOutcome,
}

/// Result of a bulk registration.
///
/// When `failure` is set the batch was aborted after `items`; records in
/// `items` stay stored and their quota was committed.
#[derive(Debug)]
pub struct BulkOutcome {
    pub items: Vec<BulkItem>,
    pub created: usize,
    pub failure: Option<AppError>,
}

/// Tunables of the registration core.
#[derive(Debug, Clone)]
pub struct RegistrationSettings {
    /// Origins treated as the service itself, e.g. `https://sho.rt`.
    pub own_origins: Vec<String>,
    pub alias_rules: AliasRules,
}

/// Orchestrates validation, expiry, admission, allocation and accounting.
pub struct RegistrationService<R: ?Sized, O: ?Sized, L: ?Sized> {
    records: Arc<R>,
    allocator: CodeAllocator<R>,
    quota: QuotaService<O>,
    rate_limiter: Arc<L>,
    settings: RegistrationSettings,
}

impl<R, O, L> RegistrationService<R, O, L>
where
    R: ShortCodeRepository + ?Sized,
    O: OwnerRepository + ?Sized,
    L: RateLimiter + ?Sized,
{
    /// Creates a new registration service.
    pub fn new(
        records: Arc<R>,
        owners: Arc<O>,
        rate_limiter: Arc<L>,
        settings: RegistrationSettings,
    ) -> Self {
        Self {
            allocator: CodeAllocator::new(records.clone()),
            records,
            quota: QuotaService::new(owners),
            rate_limiter,
            settings,
        }
    }

    pub fn settings(&self) -> &RegistrationSettings {
        &self.settings
    }

    /// Store reachability, for health reporting.
    pub async fn store_healthy(&self) -> bool {
        self.records.health_check().await
    }

    /// Registers one destination URL.
    ///
    /// # Deduplication
    ///
    /// A known owner submitting a URL it already holds a live record for gets
    /// that record back as [`RegistrationOutcome::Existing`], whatever alias
    /// or prefix was requested, and no quota is consumed.
    ///
    /// # Errors
    ///
    /// Every validation and admission failure is raised before any write.
    /// See [`AppError`] for the variants.
    pub async fn register(
        &self,
        caller: Caller,
        request: SingleRegistration,
    ) -> Result<RegistrationOutcome, AppError> {
        let now = Utc::now();
        let url = request.original_url;

        validate_destination(&url).map_err(|e| AppError::invalid_url(&url, e.to_string()))?;

        if is_self_referential(&url, &self.settings.own_origins) {
            tracing::debug!(url = %url, "Destination is a service URL, returning unchanged");
            return Ok(RegistrationOutcome::SelfReferential(url));
        }

        let owner = self.load_caller(&caller).await?;
        let expires_at = ExpirationPolicy::resolve(
            request.expires_at,
            owner.as_ref().map(|o| o.tier),
            EntryPoint::Single,
            now,
        )?;

        if owner.is_none() {
            self.check_rate_limit(caller.ip).await?;
        }

        if let Some(owner) = &owner {
            if let Some(existing) = self.records.find_by_owner_and_url(owner.id, &url).await? {
                tracing::debug!(
                    owner_id = owner.id,
                    code = %existing.short_code,
                    "Returning existing record for destination"
                );
                return Ok(RegistrationOutcome::Existing(existing));
            }

            if !self.quota.admit(owner) {
                return Err(AppError::QuotaExceeded {
                    remaining: owner.remaining_quota(),
                    requested: 1,
                });
            }
        }

        let candidate = compose(&request.code, &self.settings.alias_rules)?;
        let draft = RecordDraft {
            original_url: url,
            owner_id: caller.owner_id,
            created_at: now,
            expires_at,
        };

        let record = self.allocate(&candidate, &draft).await?;

        if let Some(owner) = &owner {
            self.quota.record(owner.id, 1).await?;
        }

        tracing::info!(
            code = %record.short_code,
            owner_id = ?record.owner_id,
            expires_at = ?record.expires_at,
            "Short code registered"
        );

        Ok(RegistrationOutcome::Created(record))
    }

    /// Registers a batch of destination URLs under one admission decision.
    ///
    /// All URLs are validated up front and the batch is rejected as a whole
    /// if any is invalid. Items are then processed in order. A store or
    /// allocation failure stops the batch; earlier records are kept and
    /// charged, and the failure is returned in [`BulkOutcome::failure`].
    ///
    /// # Errors
    ///
    /// Returns an error only when nothing was written.
    pub async fn register_bulk(
        &self,
        caller: Caller,
        request: BulkRegistration,
    ) -> Result<BulkOutcome, AppError> {
        if request.urls.is_empty() {
            return Err(AppError::validation(
                "urlList",
                "must contain at least one URL",
            ));
        }

        if request.urls.len() > MAX_BULK_URLS {
            return Err(AppError::validation(
                "urlList",
                format!("must contain at most {MAX_BULK_URLS} URLs"),
            ));
        }

        let invalid_urls: Vec<String> = request
            .urls
            .iter()
            .filter(|url| validate_destination(url).is_err())
            .cloned()
            .collect();

        if !invalid_urls.is_empty() {
            return Err(AppError::InvalidBatch { invalid_urls });
        }

        let now = Utc::now();
        let owner = self.load_caller(&caller).await?;
        let expires_at = ExpirationPolicy::resolve(
            request.expires_at,
            owner.as_ref().map(|o| o.tier),
            EntryPoint::Bulk,
            now,
        )?;

        let code_request = CodeRequest {
            prefix: request.prefix,
            alias: None,
            length: request
                .length
                .or(Some(self.settings.alias_rules.default_length as i64)),
        };
        let candidate = compose(&code_request, &self.settings.alias_rules)?;

        match &owner {
            None => self.check_rate_limit(caller.ip).await?,
            Some(owner) if !self.quota.admit_batch(owner, request.urls.len()) => {
                return Err(AppError::QuotaExceeded {
                    remaining: owner.remaining_quota(),
                    requested: request.urls.len(),
                });
            }
            Some(_) => {}
        }

        let total = request.urls.len();
        let mut items = Vec::with_capacity(total);
        let mut created = 0;
        let mut failure = None;

        for url in request.urls {
            match self
                .register_item(owner.as_ref(), &candidate, url.clone(), now, expires_at)
                .await
            {
                Ok(outcome) => {
                    if outcome.is_created() {
                        created += 1;
                    }
                    items.push(BulkItem {
                        original: url,
                        outcome,
                    });
                }
                Err(e) => {
                    tracing::error!(
                        url = %url,
                        processed = items.len(),
                        error = %e,
                        "Bulk registration aborted"
                    );
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(owner) = &owner
            && let Err(e) = self.quota.record(owner.id, created).await
        {
            failure.get_or_insert(e);
        }

        tracing::info!(
            owner_id = ?caller.owner_id,
            total,
            created,
            aborted = failure.is_some(),
            "Bulk registration completed"
        );

        Ok(BulkOutcome {
            items,
            created,
            failure,
        })
    }

    async fn register_item(
        &self,
        owner: Option<&Owner>,
        candidate: &Candidate,
        url: String,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<RegistrationOutcome, AppError> {
        if is_self_referential(&url, &self.settings.own_origins) {
            return Ok(RegistrationOutcome::SelfReferential(url));
        }

        if let Some(owner) = owner
            && let Some(existing) = self.records.find_by_owner_and_url(owner.id, &url).await?
        {
            return Ok(RegistrationOutcome::Existing(existing));
        }

        let draft = RecordDraft {
            original_url: url,
            owner_id: owner.map(|o| o.id),
            created_at: now,
            expires_at,
        };

        let record = self.allocate(candidate, &draft).await?;
        Ok(RegistrationOutcome::Created(record))
    }

    async fn allocate(
        &self,
        candidate: &Candidate,
        draft: &RecordDraft,
    ) -> Result<ShortCodeRecord, AppError> {
        match candidate {
            Candidate::Custom(code) => self.allocator.insert_custom(code.clone(), draft).await,
            Candidate::Generated { .. } => {
                self.allocator
                    .insert_generated(|| candidate.produce(), draft)
                    .await
            }
        }
    }

    async fn load_caller(&self, caller: &Caller) -> Result<Option<Owner>, AppError> {
        match caller.owner_id {
            Some(id) => Ok(Some(self.quota.load_owner(id).await?)),
            None => Ok(None),
        }
    }

    /// Anonymous callers without a resolvable IP are not limited.
    async fn check_rate_limit(&self, ip: Option<IpAddr>) -> Result<(), AppError> {
        let Some(ip) = ip else {
            tracing::debug!("Anonymous caller without client IP, skipping rate limit");
            return Ok(());
        };

        let decision = self.rate_limiter.check_limit(ip).await;
        if decision.allowed {
            return Ok(());
        }

        tracing::warn!(ip = %ip, reset_at = %decision.reset_at, "Anonymous rate limit exceeded");
        Err(AppError::RateLimited {
            reset_at: decision.reset_at,
        })
    }
}
