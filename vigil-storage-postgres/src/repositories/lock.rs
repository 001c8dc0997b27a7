//! Postgres implementation of the account lock repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vigil_core::{
    Error, error::StorageError, repositories::AccountLockRepository, storage::LockState,
};

/// Postgres repository for the lock fields on the account record.
pub struct PostgresAccountLockRepository {
    pool: PgPool,
}

impl PostgresAccountLockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountLockRepository for PostgresAccountLockRepository {
    async fn lock_state(&self, identifier: &str) -> Result<LockState, Error> {
        // Unknown accounts resolve as unlocked (prevents enumeration)
        let row: Option<(bool, Option<DateTime<Utc>>)> =
            sqlx::query_as("SELECT locked, locked_at FROM accounts WHERE email = $1")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to get lock state");
                    StorageError::Database("Failed to get lock state".to_string())
                })?;

        let state = match row {
            Some((true, Some(since))) => LockState::Locked { since },
            _ => LockState::Unlocked,
        };

        Ok(state)
    }

    async fn lock(&self, identifier: &str, at: DateTime<Utc>) -> Result<(), Error> {
        // Conditional update: a second lock never refreshes the timestamp,
        // and locking an unknown account is a silent no-op
        sqlx::query(
            r#"
            UPDATE accounts
            SET locked = TRUE, locked_at = $1, updated_at = NOW()
            WHERE email = $2 AND locked = FALSE
            "#,
        )
        .bind(at)
        .bind(identifier)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to lock account");
            StorageError::Database("Failed to lock account".to_string())
        })?;

        Ok(())
    }

    async fn unlock(&self, identifier: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET locked = FALSE, locked_at = NULL, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(identifier)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to unlock account");
            StorageError::Database("Failed to unlock account".to_string())
        })?;

        Ok(())
    }
}
