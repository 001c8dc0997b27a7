//! SQLite implementation of the login attempt ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use vigil_core::{
    Error, error::StorageError, repositories::LoginAttemptRepository, storage::LoginAttempt,
};

/// SQLite repository for the append-only attempt ledger.
pub struct SqliteLoginAttemptRepository {
    pool: SqlitePool,
}

impl SqliteLoginAttemptRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct SqliteLoginAttempt {
    id: i64,
    identifier: String,
    ip_address: String,
    successful: bool,
    attempted_at: i64,
}

impl From<SqliteLoginAttempt> for LoginAttempt {
    fn from(row: SqliteLoginAttempt) -> Self {
        LoginAttempt {
            id: row.id,
            identifier: row.identifier,
            ip_address: row.ip_address,
            successful: row.successful,
            attempted_at: DateTime::from_timestamp(row.attempted_at, 0)
                .expect("Invalid timestamp"),
        }
    }
}

#[async_trait]
impl LoginAttemptRepository for SqliteLoginAttemptRepository {
    async fn record_attempt(
        &self,
        identifier: &str,
        ip_address: &str,
        successful: bool,
        attempted_at: DateTime<Utc>,
    ) -> Result<LoginAttempt, Error> {
        let row = sqlx::query_as::<_, SqliteLoginAttempt>(
            r#"
            INSERT INTO login_attempts (identifier, ip_address, successful, attempted_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, identifier, ip_address, successful, attempted_at
            "#,
        )
        .bind(identifier)
        .bind(ip_address)
        .bind(successful)
        .bind(attempted_at.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to record login attempt");
            StorageError::Database("Failed to record login attempt".to_string())
        })?;

        Ok(row.into())
    }

    async fn count_failures_for_identifier(
        &self,
        identifier: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM login_attempts
            WHERE identifier = ? AND successful = 0 AND attempted_at >= ?
            "#,
        )
        .bind(identifier)
        .bind(since.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count failures for identifier");
            StorageError::Database("Failed to count failures for identifier".to_string())
        })?;

        Ok(count as u32)
    }

    async fn count_failures_for_address(
        &self,
        ip_address: &str,
        since: DateTime<Utc>,
    ) -> Result<u32, Error> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM login_attempts
            WHERE ip_address = ? AND successful = 0 AND attempted_at >= ?
            "#,
        )
        .bind(ip_address)
        .bind(since.timestamp())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count failures for address");
            StorageError::Database("Failed to count failures for address".to_string())
        })?;

        Ok(count as u32)
    }

    async fn purge_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < ?")
            .bind(cutoff.timestamp())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to purge old login attempts");
                StorageError::Database("Failed to purge old login attempts".to_string())
            })?;

        Ok(result.rows_affected())
    }
}
