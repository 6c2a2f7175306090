//! Unique short-code allocation.
//!
//! Generated codes go through a bounded retry loop: a candidate is checked
//! against the store, then inserted. The pre-check only saves a round trip;
//! the storage-level unique constraint is what guarantees uniqueness, and a
//! lost insert race is treated like any other collision.

use std::sync::Arc;

use crate::domain::entities::{RecordDraft, ShortCodeRecord};
use crate::domain::repositories::ShortCodeRepository;
use crate::error::{AppError, StoreError};

/// Attempt budget shared by collisions and lost insert races.
pub const MAX_ATTEMPTS: usize = 10;

/// Allocates short codes against a [`ShortCodeRepository`].
pub struct CodeAllocator<R: ?Sized> {
    records: Arc<R>,
    max_attempts: usize,
}

impl<R: ShortCodeRepository + ?Sized> CodeAllocator<R> {
    pub fn new(records: Arc<R>) -> Self {
        Self::with_max_attempts(records, MAX_ATTEMPTS)
    }

    pub fn with_max_attempts(records: Arc<R>, max_attempts: usize) -> Self {
        Self {
            records,
            max_attempts,
        }
    }

    /// Returns the first produced code that is absent from the store.
    ///
    /// Does not write; a code returned here can still be taken by a
    /// concurrent writer before it is inserted.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AllocationExhausted`] after `max_attempts` collisions,
    /// or the producer's own error.
    pub async fn resolve_unique<F>(&self, mut produce: F) -> Result<String, AppError>
    where
        F: FnMut() -> Result<String, AppError> + Send,
    {
        let mut remaining = self.max_attempts;
        self.next_free(&mut produce, &mut remaining).await
    }

    /// Allocates a generated code and inserts the record under it.
    ///
    /// An insert rejected with [`StoreError::DuplicateCode`] consumes an
    /// attempt and triggers a fresh candidate.
    pub async fn insert_generated<F>(
        &self,
        mut produce: F,
        draft: &RecordDraft,
    ) -> Result<ShortCodeRecord, AppError>
    where
        F: FnMut() -> Result<String, AppError> + Send,
    {
        let mut remaining = self.max_attempts;

        loop {
            let code = self.next_free(&mut produce, &mut remaining).await?;

            match self.records.insert(draft.with_code(code)).await {
                Ok(record) => return Ok(record),
                Err(StoreError::DuplicateCode(code)) => {
                    tracing::warn!(code = %code, remaining, "Lost insert race for short code, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Inserts a record under a caller-chosen code. No retry.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::AliasInUse`] if the code is taken, either at the
    /// existence check or by a concurrent insert.
    pub async fn insert_custom(
        &self,
        code: String,
        draft: &RecordDraft,
    ) -> Result<ShortCodeRecord, AppError> {
        if self.records.code_exists(&code).await? {
            return Err(AppError::AliasInUse(code));
        }

        match self.records.insert(draft.with_code(code.clone())).await {
            Ok(record) => Ok(record),
            Err(StoreError::DuplicateCode(_)) => Err(AppError::AliasInUse(code)),
            Err(e) => Err(e.into()),
        }
    }

    async fn next_free<F>(&self, produce: &mut F, remaining: &mut usize) -> Result<String, AppError>
    where
        F: FnMut() -> Result<String, AppError> + Send,
    {
        while *remaining > 0 {
            *remaining -= 1;

            let code = produce()?;
            if !self.records.code_exists(&code).await? {
                return Ok(code);
            }

            tracing::warn!(code = %code, remaining = *remaining, "Short code collision, retrying");
        }

        Err(AppError::AllocationExhausted {
            attempts: self.max_attempts,
        })
    }
}
