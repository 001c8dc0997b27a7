//! Brute force guard service for pre-auth denial and account lockout.
//!
//! The guard sits at two points around credential verification:
//!
//! - Before it, [`BruteForceGuard::pre_auth_check`] denies the attempt
//!   outright when recent failure volume from the claimed identifier or the
//!   source address exceeds its threshold within the sliding window.
//! - After a failure has been recorded, [`BruteForceGuard::post_failure_check`]
//!   re-derives the identifier's failure count and locks the account when the
//!   threshold is reached.
//!
//! Locks are lifted lazily: [`BruteForceGuard::resolve_lock_state`] is called
//! whenever an account is looked up for authentication and unlocks in place
//! once the lock duration has elapsed. There is no background sweeper.
//!
//! # Example
//!
//! ```rust,ignore
//! use vigil_core::{BruteForceGuard, LockoutPolicy};
//! use chrono::Utc;
//!
//! let guard = BruteForceGuard::new(attempts, locks, LockoutPolicy::default());
//!
//! // Before credential verification
//! guard.pre_auth_check("user@example.com", "192.168.1.1", Utc::now()).await?;
//!
//! // After a failed verification has been recorded
//! guard.post_failure_check("user@example.com", Utc::now()).await?;
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Error,
    error::AuthError,
    policy::LockoutPolicy,
    repositories::{AccountLockRepository, LoginAttemptRepository},
    storage::LockState,
    validation::normalize_identifier,
};

/// Service deciding whether a login attempt may proceed and whether an
/// account must be locked.
///
/// Every decision is derived fresh from the attempt ledger; the guard holds
/// no mutable state of its own and is safe to share across concurrent
/// requests. Two concurrent failing attempts may both pass the count check
/// just below the threshold; the design tolerates this because
/// [`AccountLockRepository::lock`] is idempotent and the next attempt
/// observes the elevated count.
pub struct BruteForceGuard<A: LoginAttemptRepository, L: AccountLockRepository> {
    attempts: Arc<A>,
    locks: Arc<L>,
    policy: LockoutPolicy,
}

impl<A: LoginAttemptRepository, L: AccountLockRepository> BruteForceGuard<A, L> {
    pub fn new(attempts: Arc<A>, locks: Arc<L>, policy: LockoutPolicy) -> Self {
        policy.validate();
        Self {
            attempts,
            locks,
            policy,
        }
    }

    /// Get the policy driving this guard.
    pub fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Decide whether an attempt may proceed to credential verification.
    ///
    /// Counts failed attempts for the normalized identifier and for the
    /// source address over the trailing window ending at `now`, and denies
    /// with [`AuthError::TooManyAttempts`] when either count has reached its
    /// threshold. A blank identifier skips the identifier-scoped count (an
    /// unknown account cannot be rate limited by name) but the address-scoped
    /// count still applies.
    ///
    /// Has no side effects; the attempt is recorded separately by the
    /// recorder once verification completes.
    pub async fn pre_auth_check(
        &self,
        identifier: &str,
        ip_address: &str,
        now: DateTime<Utc>,
    ) -> Result<(), Error> {
        let cutoff = now - self.policy.window;
        let identifier = normalize_identifier(Some(identifier));

        if !identifier.is_empty() {
            let failures = self
                .attempts
                .count_failures_for_identifier(&identifier, cutoff)
                .await?;
            if failures >= self.policy.max_failures_per_identifier {
                tracing::warn!(
                    identifier = %identifier,
                    failures = failures,
                    "Denying login attempt, identifier failure threshold reached"
                );
                return Err(AuthError::TooManyAttempts.into());
            }
        }

        let failures = self
            .attempts
            .count_failures_for_address(ip_address, cutoff)
            .await?;
        if failures >= self.policy.max_failures_per_address {
            tracing::warn!(
                ip_address = %ip_address,
                failures = failures,
                "Denying login attempt, address failure threshold reached"
            );
            return Err(AuthError::TooManyAttempts.into());
        }

        Ok(())
    }

    /// Resolve the effective lock state for an account, lifting an expired
    /// lock in place.
    ///
    /// Called before or during credential verification so that an expired
    /// lock never blocks a legitimate login. This is the only path by which a
    /// lock is lifted automatically.
    pub async fn resolve_lock_state(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<LockState, Error> {
        let identifier = normalize_identifier(Some(identifier));
        let state = self.locks.lock_state(&identifier).await?;

        if let LockState::Locked { since } = state {
            if now >= since + self.policy.lock_duration {
                self.locks.unlock(&identifier).await?;
                tracing::info!(identifier = %identifier, "Lock duration elapsed, account unlocked");
                return Ok(LockState::Unlocked);
            }
        }

        Ok(state)
    }

    /// Re-derive the identifier's failure count after a failed attempt has
    /// been recorded, and lock the account when the threshold is reached.
    ///
    /// Must be called after the failure is in the ledger so the just-failed
    /// attempt is included in the count. A blank identifier is a no-op.
    ///
    /// # Returns
    ///
    /// `true` when the account is locked as a result of this check.
    pub async fn post_failure_check(
        &self,
        identifier: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, Error> {
        let identifier = normalize_identifier(Some(identifier));
        if identifier.is_empty() {
            return Ok(false);
        }

        let cutoff = now - self.policy.window;
        let failures = self
            .attempts
            .count_failures_for_identifier(&identifier, cutoff)
            .await?;

        if failures >= self.policy.max_failures_per_identifier {
            self.locks.lock(&identifier, now).await?;
            tracing::warn!(
                identifier = %identifier,
                failures = failures,
                "Failure threshold reached, account locked"
            );
            return Ok(true);
        }

        Ok(false)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::LoginAttempt;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::sync::Mutex;

    /// Mock attempt ledger for testing
    pub(crate) struct MockAttemptRepository {
        pub(crate) attempts: Mutex<Vec<LoginAttempt>>,
    }

    impl MockAttemptRepository {
        pub(crate) fn new() -> Self {
            Self {
                attempts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LoginAttemptRepository for MockAttemptRepository {
        async fn record_attempt(
            &self,
            identifier: &str,
            ip_address: &str,
            successful: bool,
            attempted_at: DateTime<Utc>,
        ) -> Result<LoginAttempt, Error> {
            let mut attempts = self.attempts.lock().unwrap();
            let attempt = LoginAttempt {
                id: attempts.len() as i64 + 1,
                identifier: identifier.to_string(),
                ip_address: ip_address.to_string(),
                successful,
                attempted_at,
            };
            attempts.push(attempt.clone());
            Ok(attempt)
        }

        async fn count_failures_for_identifier(
            &self,
            identifier: &str,
            since: DateTime<Utc>,
        ) -> Result<u32, Error> {
            let attempts = self.attempts.lock().unwrap();
            Ok(attempts
                .iter()
                .filter(|a| !a.successful && a.identifier == identifier && a.attempted_at >= since)
                .count() as u32)
        }

        async fn count_failures_for_address(
            &self,
            ip_address: &str,
            since: DateTime<Utc>,
        ) -> Result<u32, Error> {
            let attempts = self.attempts.lock().unwrap();
            Ok(attempts
                .iter()
                .filter(|a| !a.successful && a.ip_address == ip_address && a.attempted_at >= since)
                .count() as u32)
        }

        async fn purge_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
            let mut attempts = self.attempts.lock().unwrap();
            let before_len = attempts.len();
            attempts.retain(|a| a.attempted_at >= cutoff);
            Ok((before_len - attempts.len()) as u64)
        }
    }

    /// Mock lock repository for testing
    pub(crate) struct MockLockRepository {
        pub(crate) state: Mutex<LockState>,
    }

    impl MockLockRepository {
        pub(crate) fn new() -> Self {
            Self {
                state: Mutex::new(LockState::Unlocked),
            }
        }
    }

    #[async_trait]
    impl AccountLockRepository for MockLockRepository {
        async fn lock_state(&self, _identifier: &str) -> Result<LockState, Error> {
            Ok(*self.state.lock().unwrap())
        }

        async fn lock(&self, _identifier: &str, at: DateTime<Utc>) -> Result<(), Error> {
            let mut state = self.state.lock().unwrap();
            // Conditional update: an existing lock keeps its timestamp
            if !state.is_locked() {
                *state = LockState::Locked { since: at };
            }
            Ok(())
        }

        async fn unlock(&self, _identifier: &str) -> Result<(), Error> {
            *self.state.lock().unwrap() = LockState::Unlocked;
            Ok(())
        }
    }

    fn test_policy() -> LockoutPolicy {
        LockoutPolicy {
            max_failures_per_identifier: 3,
            max_failures_per_address: 20,
            window: Duration::minutes(10),
            lock_duration: Duration::minutes(30),
        }
    }

    fn guard_with(
        attempts: Arc<MockAttemptRepository>,
        locks: Arc<MockLockRepository>,
    ) -> BruteForceGuard<MockAttemptRepository, MockLockRepository> {
        BruteForceGuard::new(attempts, locks, test_policy())
    }

    async fn record_failures(
        attempts: &MockAttemptRepository,
        identifier: &str,
        ip_address: &str,
        count: usize,
        at: DateTime<Utc>,
    ) {
        for _ in 0..count {
            attempts
                .record_attempt(identifier, ip_address, false, at)
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_pre_auth_approves_below_threshold() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        record_failures(&attempts, "a@x.com", "1.2.3.4", 2, now).await;

        assert!(guard.pre_auth_check("a@x.com", "1.2.3.4", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_pre_auth_denies_at_identifier_threshold() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        // Denial is boundary-inclusive: exactly 3 failures denies
        record_failures(&attempts, "a@x.com", "5.6.7.8", 3, now).await;

        let err = guard
            .pre_auth_check("a@x.com", "1.2.3.4", now)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TooManyAttempts)));
    }

    #[tokio::test]
    async fn test_pre_auth_denies_at_address_threshold() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        // 20 failures from one address, spread across identifiers under
        // their own thresholds: the address check dominates.
        for i in 0..20 {
            attempts
                .record_attempt(&format!("user{i}@x.com"), "1.2.3.4", false, now)
                .await
                .unwrap();
        }

        let err = guard
            .pre_auth_check("fresh@x.com", "1.2.3.4", now)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TooManyAttempts)));
    }

    #[tokio::test]
    async fn test_pre_auth_approves_when_both_below() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        // Two failures for the address against a limit of 20, none for the
        // identifier
        record_failures(&attempts, "other@x.com", "1.2.3.4", 2, now).await;

        assert!(guard.pre_auth_check("a@x.com", "1.2.3.4", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_pre_auth_blank_identifier_still_checks_address() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        // Blank identifier alone is fine
        assert!(guard.pre_auth_check("", "1.2.3.4", now).await.is_ok());
        assert!(guard.pre_auth_check("   ", "1.2.3.4", now).await.is_ok());

        // But the address check still applies
        for _ in 0..20 {
            attempts
                .record_attempt("", "1.2.3.4", false, now)
                .await
                .unwrap();
        }
        let err = guard
            .pre_auth_check("", "1.2.3.4", now)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TooManyAttempts)));
    }

    #[tokio::test]
    async fn test_pre_auth_normalizes_identifier() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        record_failures(&attempts, "test@mail.com", "5.6.7.8", 3, now).await;

        let err = guard
            .pre_auth_check("  TeSt@Mail.Com ", "1.2.3.4", now)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TooManyAttempts)));
    }

    #[tokio::test]
    async fn test_failures_outside_window_age_out() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        record_failures(&attempts, "a@x.com", "1.2.3.4", 3, now - Duration::minutes(11)).await;

        // All failures predate the 10 minute window
        assert!(guard.pre_auth_check("a@x.com", "1.2.3.4", now).await.is_ok());
    }

    #[tokio::test]
    async fn test_success_does_not_reset_failure_count() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks);
        let now = Utc::now();

        record_failures(&attempts, "a@x.com", "1.2.3.4", 3, now).await;
        attempts
            .record_attempt("a@x.com", "1.2.3.4", true, now)
            .await
            .unwrap();

        // The success does not decrement the windowed failure count
        let err = guard
            .pre_auth_check("a@x.com", "1.2.3.4", now)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::TooManyAttempts)));
    }

    #[tokio::test]
    async fn test_post_failure_locks_at_threshold() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks.clone());
        let now = Utc::now();

        record_failures(&attempts, "a@x.com", "1.2.3.4", 2, now).await;
        assert!(!guard.post_failure_check("a@x.com", now).await.unwrap());
        assert!(!locks.state.lock().unwrap().is_locked());

        // Third failure recorded, then re-checked: locks
        record_failures(&attempts, "a@x.com", "1.2.3.4", 1, now).await;
        assert!(guard.post_failure_check("a@x.com", now).await.unwrap());
        assert_eq!(
            locks.state.lock().unwrap().locked_since(),
            Some(now)
        );
    }

    #[tokio::test]
    async fn test_post_failure_lock_is_idempotent() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks.clone());
        let first = Utc::now();
        let later = first + Duration::minutes(5);

        record_failures(&attempts, "a@x.com", "1.2.3.4", 3, first).await;
        assert!(guard.post_failure_check("a@x.com", first).await.unwrap());

        // A further breach must not refresh the lock timestamp
        record_failures(&attempts, "a@x.com", "1.2.3.4", 1, later).await;
        assert!(guard.post_failure_check("a@x.com", later).await.unwrap());

        assert_eq!(
            locks.state.lock().unwrap().locked_since(),
            Some(first)
        );
    }

    #[tokio::test]
    async fn test_post_failure_blank_identifier_is_noop() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks.clone());
        let now = Utc::now();

        record_failures(&attempts, "", "1.2.3.4", 5, now).await;

        assert!(!guard.post_failure_check("  ", now).await.unwrap());
        assert!(!locks.state.lock().unwrap().is_locked());
    }

    #[tokio::test]
    async fn test_post_failure_normalizes_identifier() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts.clone(), locks.clone());
        let now = Utc::now();

        record_failures(&attempts, "test@mail.com", "1.2.3.4", 3, now).await;

        assert!(
            guard
                .post_failure_check(" TeSt@Mail.Com ", now)
                .await
                .unwrap()
        );
        assert!(locks.state.lock().unwrap().is_locked());
    }

    #[tokio::test]
    async fn test_resolve_lock_state_before_expiry() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts, locks.clone());
        let locked_at = Utc::now();

        locks.lock("a@x.com", locked_at).await.unwrap();

        // 29 minutes in: still locked, state untouched
        let state = guard
            .resolve_lock_state("a@x.com", locked_at + Duration::minutes(29))
            .await
            .unwrap();
        assert_eq!(state, LockState::Locked { since: locked_at });
        assert!(locks.state.lock().unwrap().is_locked());
    }

    #[tokio::test]
    async fn test_resolve_lock_state_unlocks_at_expiry() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts, locks.clone());
        let locked_at = Utc::now();

        locks.lock("a@x.com", locked_at).await.unwrap();

        // Exactly at lock_duration the unlock is eligible
        let state = guard
            .resolve_lock_state("a@x.com", locked_at + Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(state, LockState::Unlocked);
        assert!(!locks.state.lock().unwrap().is_locked());
    }

    #[tokio::test]
    async fn test_resolve_lock_state_unlocked_account() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let locks = Arc::new(MockLockRepository::new());
        let guard = guard_with(attempts, locks);

        let state = guard
            .resolve_lock_state("a@x.com", Utc::now())
            .await
            .unwrap();
        assert_eq!(state, LockState::Unlocked);
    }
}
