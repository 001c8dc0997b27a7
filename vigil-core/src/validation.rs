//! Identifier normalization.
//!
//! Every rate-limit key derived from a submitted account identifier goes
//! through [`normalize_identifier`], so `"TeSt@Mail.Com "` and
//! `"test@mail.com"` are counted and locked as the same key. This module is
//! the single source of truth for that rule.

/// Normalize a submitted account identifier into a ledger key.
///
/// Trims surrounding whitespace and lowercases. An absent identifier becomes
/// the empty string rather than an error: the login form may be submitted
/// without one, and the attempt must still be recordable and the
/// address-scoped checks must still apply.
pub fn normalize_identifier(identifier: Option<&str>) -> String {
    identifier
        .map(|id| id.trim().to_lowercase())
        .unwrap_or_default()
}
