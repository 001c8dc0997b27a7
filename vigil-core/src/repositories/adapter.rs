use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Error,
    repositories::{AccountLockRepository, LoginAttemptRepository, RepositoryProvider},
    storage::{LockState, LoginAttempt},
};

/// Adapter that wraps a [`RepositoryProvider`] and implements the attempt
/// ledger trait by delegation, so services can be generic over a single
/// repository type while backends expose a unified provider.
pub struct AttemptRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AttemptRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> LoginAttemptRepository for AttemptRepositoryAdapter<R> {
    async fn record_attempt(
        &self,
        identifier: &str,
        ip_address: &str,
        successful: bool,
        attempted_at: DateTime<Utc>,
    ) -> Result<LoginAttempt, Error> {
        self.provider
            .attempts()
            .record_attempt(identifier, ip_address, successful, attempted_at)
            .await
    }

    async fn count_failures_for_identifier(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, Error> {
        self.provider
            .attempts()
            .count_failures_for_identifier(identifier, since)
            .await
    }

    async fn count_failures_for_address(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, Error> {
        self.provider
            .attempts()
            .count_failures_for_address(ip_address, since)
            .await
    }

    async fn purge_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        self.provider.attempts().purge_attempts_before(cutoff).await
    }
}

/// Adapter that wraps a [`RepositoryProvider`] and implements the account
/// lock trait by delegation.
pub struct LockRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> LockRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AccountLockRepository for LockRepositoryAdapter<R> {
    async fn lock_state(&self, identifier: &str) -> Result<LockState, Error> {
        self.provider.locks().lock_state(identifier).await
    }

    async fn lock(&self, identifier: &str, at: DateTime<Utc>) -> Result<(), Error> {
        self.provider.locks().lock(identifier, at).await
    }

    async fn unlock(&self, identifier: &str) -> Result<(), Error> {
        self.provider.locks().unlock(identifier).await
    }
}
