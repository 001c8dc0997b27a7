//! SQLite implementation of the account lock repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use vigil_core::{
    Error, error::StorageError, repositories::AccountLockRepository, storage::LockState,
};

/// SQLite repository for the lock fields on the account record.
pub struct SqliteAccountLockRepository {
    pool: SqlitePool,
}

impl SqliteAccountLockRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountLockRepository for SqliteAccountLockRepository {
    async fn lock_state(&self, identifier: &str) -> Result<LockState, Error> {
        // Unknown accounts resolve as unlocked (prevents enumeration)
        let row: Option<(bool, Option<i64>)> =
            sqlx::query_as("SELECT locked, locked_at FROM accounts WHERE email = ?")
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to get lock state");
                    StorageError::Database("Failed to get lock state".to_string())
                })?;

        let state = match row {
            Some((true, Some(ts))) => LockState::Locked {
                since: DateTime::from_timestamp(ts, 0).expect("Invalid timestamp"),
            },
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
            SET locked = 1, locked_at = ?, updated_at = unixepoch()
            WHERE email = ? AND locked = 0
            "#,
        )
        .bind(at.timestamp())
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
            SET locked = 0, locked_at = NULL, updated_at = unixepoch()
            WHERE email = ?
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
