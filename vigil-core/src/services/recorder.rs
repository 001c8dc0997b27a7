//! Attempt recorder service.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    Error, repositories::LoginAttemptRepository, storage::LoginAttempt,
    validation::normalize_identifier,
};

/// Service that writes the outcome of every completed login attempt to the
/// ledger.
///
/// Called exactly once per attempt that reached credential verification,
/// success or failure, regardless of whether the pre-auth check approved it.
pub struct AttemptRecorder<A: LoginAttemptRepository> {
    attempts: Arc<A>,
}

impl<A: LoginAttemptRepository> AttemptRecorder<A> {
    pub fn new(attempts: Arc<A>) -> Self {
        Self { attempts }
    }

    /// Record a completed attempt with `attempted_at = now`.
    ///
    /// The identifier is normalized here (trimmed, lowercased, absent becomes
    /// the empty string) so ledger keys are uniform no matter what the login
    /// form submitted.
    pub async fn record_outcome(
        &self,
        identifier: Option<&str>,
        ip_address: &str,
        successful: bool,
    ) -> Result<LoginAttempt, Error> {
        let identifier = normalize_identifier(identifier);
        self.attempts
            .record_attempt(&identifier, ip_address, successful, Utc::now())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::guard::tests::MockAttemptRepository;

    #[tokio::test]
    async fn test_record_outcome_normalizes() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let recorder = AttemptRecorder::new(attempts.clone());

        let attempt = recorder
            .record_outcome(Some("  TeSt@Mail.Com "), "1.2.3.4", false)
            .await
            .unwrap();

        assert_eq!(attempt.identifier, "test@mail.com");
        assert_eq!(attempt.ip_address, "1.2.3.4");
        assert!(!attempt.successful);
    }

    #[tokio::test]
    async fn test_record_outcome_absent_identifier() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let recorder = AttemptRecorder::new(attempts.clone());

        let attempt = recorder
            .record_outcome(None, "1.2.3.4", false)
            .await
            .unwrap();

        assert_eq!(attempt.identifier, "");
    }

    #[tokio::test]
    async fn test_recorded_failure_is_immediately_counted() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let recorder = AttemptRecorder::new(attempts.clone());
        let before = Utc::now() - chrono::Duration::minutes(1);

        recorder
            .record_outcome(Some("a@x.com"), "1.2.3.4", false)
            .await
            .unwrap();

        // Read-your-write: the count reflects the just-recorded attempt
        let count = attempts
            .count_failures_for_identifier("a@x.com", before)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_successes_are_recorded_but_not_counted_as_failures() {
        let attempts = Arc::new(MockAttemptRepository::new());
        let recorder = AttemptRecorder::new(attempts.clone());
        let before = Utc::now() - chrono::Duration::minutes(1);

        recorder
            .record_outcome(Some("a@x.com"), "1.2.3.4", true)
            .await
            .unwrap();

        assert_eq!(attempts.attempts.lock().unwrap().len(), 1);
        let count = attempts
            .count_failures_for_identifier("a@x.com", before)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
