//! # Vigil
//!
//! Vigil is a brute-force detection and account-lockout guard for
//! credential-based login endpoints. Before credential verification it
//! decides whether an attempt must be rejected outright because recent
//! failure volume from the claimed identifier or the source address exceeds
//! configured thresholds within a sliding window; after verification it
//! records the outcome and, when the per-account threshold is crossed, locks
//! the account for a bounded, auto-expiring duration.
//!
//! Vigil does not verify credentials, issue sessions, or parse addresses —
//! those remain with the application. It owns the attempt ledger, the
//! threshold policy, and the lock state machine.
//!
//! ## Storage Support
//!
//! Vigil currently supports the following storage backends:
//! - SQLite
//! - Postgres
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use vigil::{LockoutPolicy, Vigil};
//! use vigil_storage_sqlite::SqliteRepositoryProvider;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
//!     let repositories = Arc::new(SqliteRepositoryProvider::new(pool));
//!
//!     let vigil = Vigil::new(repositories, LockoutPolicy::default());
//!     vigil.migrate().await.unwrap();
//!
//!     // Before credential verification:
//!     match vigil.check_login_allowed("user@example.com", "192.168.1.1").await {
//!         Ok(()) => { /* proceed to verify the password */ }
//!         Err(e) if e.is_auth_error() => { /* respond with the same generic
//!             "invalid credentials" message used for a wrong password */ }
//!         Err(_) => { /* storage failure: fail the request, never approve */ }
//!     }
//!
//!     // After verification, exactly once per completed attempt:
//!     vigil
//!         .record_login_outcome(Some("user@example.com"), "192.168.1.1", false)
//!         .await
//!         .unwrap();
//! }
//! ```
//!
//! ## Response hygiene
//!
//! [`AuthError::TooManyAttempts`] and [`AuthError::AccountLocked`] must be
//! rendered with the identical generic failure message used for ordinary
//! bad-credential failures, without counts or thresholds, so an attacker
//! cannot distinguish "wrong password", "rate limited", and "locked".

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use vigil_core::{
    AttemptRecorder, BruteForceGuard,
    repositories::{AttemptRepositoryAdapter, LockRepositoryAdapter, LoginAttemptRepository},
    validation::normalize_identifier,
};

/// Re-export core types from vigil_core
///
/// These types are commonly used when working with the Vigil API.
pub use vigil_core::{
    AuthError, Error, LockState, LockoutPolicy, LoginAttempt, RepositoryProvider, StorageError,
};

/// Re-export storage backends
///
/// These storage implementations are available when the corresponding feature
/// is enabled.
#[cfg(feature = "sqlite")]
pub use vigil_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "postgres")]
pub use vigil_storage_postgres::PostgresRepositoryProvider;

/// The main entry point: a guard and recorder wired over a repository
/// provider.
///
/// `Vigil` is cheap to share (`Arc` it once) and safe for concurrent use by
/// parallel login requests; every decision is derived fresh from storage.
pub struct Vigil<R: RepositoryProvider> {
    repositories: Arc<R>,
    attempts: Arc<AttemptRepositoryAdapter<R>>,
    locks: Arc<LockRepositoryAdapter<R>>,
    guard: BruteForceGuard<AttemptRepositoryAdapter<R>, LockRepositoryAdapter<R>>,
    recorder: AttemptRecorder<AttemptRepositoryAdapter<R>>,
}

impl<R: RepositoryProvider> Vigil<R> {
    /// Create a new Vigil instance with the given repositories and policy.
    pub fn new(repositories: Arc<R>, policy: LockoutPolicy) -> Self {
        let attempts = Arc::new(AttemptRepositoryAdapter::new(repositories.clone()));
        let locks = Arc::new(LockRepositoryAdapter::new(repositories.clone()));
        let guard = BruteForceGuard::new(attempts.clone(), locks.clone(), policy);
        let recorder = AttemptRecorder::new(attempts.clone());

        Self {
            repositories,
            attempts,
            locks,
            guard,
            recorder,
        }
    }

    /// The policy driving this instance.
    pub fn policy(&self) -> &LockoutPolicy {
        self.guard.policy()
    }

    /// Run storage migrations.
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Health check for the underlying storage.
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Decide whether a login attempt may proceed to credential verification.
    ///
    /// Resolves the account's lock state first (lifting an expired lock in
    /// place) and errors with [`AuthError::AccountLocked`] while locked, then
    /// applies the windowed failure checks, erroring with
    /// [`AuthError::TooManyAttempts`] when a threshold is reached.
    ///
    /// Storage errors propagate unchanged; treat them as a failed request,
    /// never as approval.
    pub async fn check_login_allowed(
        &self,
        identifier: &str,
        ip_address: &str,
    ) -> Result<(), Error> {
        let now = Utc::now();

        if self
            .guard
            .resolve_lock_state(identifier, now)
            .await?
            .is_locked()
        {
            return Err(AuthError::AccountLocked.into());
        }

        self.guard.pre_auth_check(identifier, ip_address, now).await
    }

    /// Record the outcome of a completed login attempt.
    ///
    /// Must be called exactly once per attempt that reached credential
    /// verification, success or failure. After a failure the per-identifier
    /// count is re-derived from the ledger (including the attempt just
    /// recorded) and the account is locked when the threshold is reached.
    ///
    /// # Returns
    ///
    /// `true` when the account is locked as a result of this outcome.
    pub async fn record_login_outcome(
        &self,
        identifier: Option<&str>,
        ip_address: &str,
        successful: bool,
    ) -> Result<bool, Error> {
        let attempt = self
            .recorder
            .record_outcome(identifier, ip_address, successful)
            .await?;

        if successful {
            return Ok(false);
        }

        self.guard
            .post_failure_check(&attempt.identifier, Utc::now())
            .await
    }

    /// Resolve the effective lock state for an account, lifting an expired
    /// lock in place.
    pub async fn resolve_lock_state(&self, identifier: &str) -> Result<LockState, Error> {
        self.guard.resolve_lock_state(identifier, Utc::now()).await
    }

    /// Whether an account is currently locked (convenience method).
    pub async fn is_locked(&self, identifier: &str) -> Result<bool, Error> {
        Ok(self.resolve_lock_state(identifier).await?.is_locked())
    }

    /// Administrative unlock, regardless of elapsed lock duration.
    pub async fn unlock_account(&self, identifier: &str) -> Result<(), Error> {
        use vigil_core::repositories::AccountLockRepository;

        let identifier = normalize_identifier(Some(identifier));
        self.locks.unlock(&identifier).await?;
        tracing::info!(identifier = %identifier, "Account unlocked administratively");
        Ok(())
    }

    /// Delete ledger rows older than `cutoff`.
    ///
    /// Retention management only: windowed counts exclude aged rows whether
    /// or not they have been purged.
    pub async fn purge_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        self.attempts.purge_attempts_before(cutoff).await
    }

    /// Start the background retention task.
    ///
    /// Spawns a task that periodically purges ledger rows older than
    /// `retention`. Decisions never depend on this task; it only bounds
    /// storage growth.
    ///
    /// # Arguments
    ///
    /// * `retention` - Age beyond which attempt rows are deleted
    /// * `shutdown` - A watch receiver that signals when to stop the task
    ///
    /// # Returns
    ///
    /// A `JoinHandle` for the spawned task.
    pub fn start_retention_task(
        &self,
        retention: Duration,
        mut shutdown: tokio::sync::watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let attempts = Arc::clone(&self.attempts);

        // Retention runs hourly
        const PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(3600);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(PURGE_INTERVAL);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let cutoff = Utc::now() - retention;
                        match attempts.purge_attempts_before(cutoff).await {
                            Ok(count) if count > 0 => {
                                tracing::info!(
                                    count = count,
                                    "Purged old login attempt records"
                                );
                            }
                            Err(e) => {
                                tracing::warn!(
                                    error = %e,
                                    "Failed to purge login attempt records"
                                );
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown.changed() => {
                        tracing::info!("Shutting down login attempt retention task");
                        break;
                    }
                }
            }
        })
    }
}
