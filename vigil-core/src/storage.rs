use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single row in the append-only attempt ledger.
///
/// Rows are immutable once written. The `identifier` is the normalized
/// account email (trimmed, lowercased, possibly empty when the submission
/// carried no identifier); the `ip_address` is stored as an opaque string
/// resolved by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub id: i64,
    pub identifier: String,
    pub ip_address: String,
    pub successful: bool,
    pub attempted_at: DateTime<Utc>,
}

/// Lock status of an account.
///
/// The lock timestamp exists exactly when the account is locked, so the
/// "timestamp is non-null iff locked" invariant holds by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    Unlocked,
    Locked { since: DateTime<Utc> },
}

impl LockState {
    pub fn is_locked(&self) -> bool {
        matches!(self, LockState::Locked { .. })
    }

    /// The instant the lock was applied, if locked.
    pub fn locked_since(&self) -> Option<DateTime<Utc>> {
        match self {
            LockState::Unlocked => None,
            LockState::Locked { since } => Some(*since),
        }
    }
}
