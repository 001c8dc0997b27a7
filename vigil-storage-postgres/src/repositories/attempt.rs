//! Postgres implementation of the login attempt ledger.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use vigil_core::{
    Error, error::StorageError, repositories::LoginAttemptRepository, storage::LoginAttempt,
};

/// Postgres repository for the append-only attempt ledger.
pub struct PostgresLoginAttemptRepository {
    pool: PgPool,
}

impl PostgresLoginAttemptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal struct for query results
#[derive(Debug, sqlx::FromRow)]
struct PostgresLoginAttempt {
    id: i64,
    identifier: String,
    ip_address: String,
    successful: bool,
    attempted_at: DateTime<Utc>,
}

impl From<PostgresLoginAttempt> for LoginAttempt {
    fn from(row: PostgresLoginAttempt) -> Self {
        LoginAttempt {
            id: row.id,
            identifier: row.identifier,
            ip_address: row.ip_address,
            successful: row.successful,
            attempted_at: row.attempted_at,
        }
    }
}

#[async_trait]
impl LoginAttemptRepository for PostgresLoginAttemptRepository {
    async fn record_attempt(
        &self,
        identifier: &str,
        ip_address: &str,
        successful: bool,
        attempted_at: DateTime<Utc>,
    ) -> Result<LoginAttempt, Error> {
        let row = sqlx::query_as::<_, PostgresLoginAttempt>(
            r#"
            INSERT INTO login_attempts (identifier, ip_address, successful, attempted_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, identifier, ip_address, successful, attempted_at
            "#,
        )
        .bind(identifier)
        .bind(ip_address)
        .bind(successful)
        .bind(attempted_at)
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
            WHERE identifier = $1 AND successful = FALSE AND attempted_at >= $2
            "#,
        )
        .bind(identifier)
        .bind(since)
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
            WHERE ip_address = $1 AND successful = FALSE AND attempted_at >= $2
            "#,
        )
        .bind(ip_address)
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to count failures for address");
            StorageError::Database("Failed to count failures for address".to_string())
        })?;

        Ok(count as u32)
    }

    async fn purge_attempts_before(&self, cutoff: DateTime<Utc>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE attempted_at < $1")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to purge old login attempts");
                StorageError::Database("Failed to purge old login attempts".to_string())
            })?;

        Ok(result.rows_affected())
    }
}
