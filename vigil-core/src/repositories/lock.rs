//! Repository trait for per-account lock state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, storage::LockState};

/// Repository for the lock fields on the account record.
///
/// Implementations persist a `locked` flag and a lock timestamp; the
/// timestamp is set exactly when the flag is, which is why the trait speaks
/// in terms of [`LockState`] rather than two separate fields.
///
/// # Security Considerations
///
/// - [`lock_state`](Self::lock_state) reports `Unlocked` for unknown
///   identifiers, and [`lock`](Self::lock) against an unknown identifier is a
///   silent no-op. Lock handling must never reveal whether an account exists.
#[async_trait]
pub trait AccountLockRepository: Send + Sync + 'static {
    /// Current lock state for an identifier, as stored.
    ///
    /// This does not evaluate lock expiry; callers that need the effective
    /// state go through the guard's `resolve_lock_state`.
    async fn lock_state(&self, identifier: &str) -> Result<LockState, Error>;

    /// Lock an account, recording `at` as the lock instant.
    ///
    /// Idempotent: locking an already-locked account is a no-op and does not
    /// refresh the stored timestamp, so a burst of concurrent failures cannot
    /// extend a lockout indefinitely. Implementations should condition the
    /// update on the current state (`... WHERE locked = FALSE`) where the
    /// storage layer supports it.
    async fn lock(&self, identifier: &str, at: DateTime<Utc>) -> Result<(), Error>;

    /// Unlock an account, clearing the flag and the timestamp.
    async fn unlock(&self, identifier: &str) -> Result<(), Error>;
}
