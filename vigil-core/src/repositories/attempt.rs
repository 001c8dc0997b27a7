//! Repository trait for the append-only attempt ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{Error, storage::LoginAttempt};

/// Repository for the login attempt ledger.
///
/// The ledger is append-only: rows are never updated after insertion, and the
/// only deletion path is [`purge_attempts_before`](Self::purge_attempts_before),
/// which exists for retention management and is never consulted by decision
/// logic. Counts are recomputed from the ledger at every decision, so there is
/// no cached counter that can drift from the underlying log.
///
/// # Security Considerations
///
/// - Attempts are recorded for every submitted identifier, including ones
///   that match no account, to keep rate limiting uniform and prevent user
///   enumeration.
/// - Identifiers must be normalized by the caller before they reach this
///   trait; the ledger compares keys byte-for-byte.
/// - Stored IP addresses may be subject to data retention regulations.
#[async_trait]
pub trait LoginAttemptRepository: Send + Sync + 'static {
    /// Append one attempt row.
    ///
    /// # Arguments
    ///
    /// * `identifier` - Normalized account identifier (may be empty)
    /// * `ip_address` - Source address of the attempt, as an opaque string
    /// * `successful` - Outcome reported by credential verification
    /// * `attempted_at` - Instant of the attempt
    ///
    /// # Returns
    ///
    /// The inserted [`LoginAttempt`] with its assigned ID.
    async fn record_attempt(
        &self,
        identifier: &str,
        ip_address: &str,
        successful: bool,
        attempted_at: DateTime<Utc>,
    ) -> Result<LoginAttempt, Error>;

    /// Count failed attempts for an identifier with `attempted_at >= since`.
    async fn count_failures_for_identifier(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, Error>;

    /// Count failed attempts from a source address with `attempted_at >= since`.
    async fn count_failures_for_address(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, Error>;

    /// Delete attempts with `attempted_at < cutoff`.
    ///
    /// Used only by the retention task; windowed counts already exclude aged
    /// rows regardless of whether they have been purged.
    ///
    /// # Returns
    ///
    /// The number of rows deleted.
    async fn purge_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error>;
}
