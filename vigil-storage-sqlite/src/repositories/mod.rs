//! Repository implementations for SQLite storage

pub mod attempt;
pub mod lock;

pub use attempt::SqliteLoginAttemptRepository;
pub use lock::SqliteAccountLockRepository;

use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use vigil_core::{
    Error,
    error::StorageError,
    repositories::{AttemptRepositoryProvider, LockRepositoryProvider, RepositoryProvider},
};

/// Repository provider implementation for SQLite
///
/// This struct implements the individual repository provider traits as well
/// as the unified `RepositoryProvider` trait.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    attempts: Arc<SqliteLoginAttemptRepository>,
    locks: Arc<SqliteAccountLockRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let attempts = Arc::new(SqliteLoginAttemptRepository::new(pool.clone()));
        let locks = Arc::new(SqliteAccountLockRepository::new(pool.clone()));

        Self {
            pool,
            attempts,
            locks,
        }
    }
}

impl AttemptRepositoryProvider for SqliteRepositoryProvider {
    type AttemptRepo = SqliteLoginAttemptRepository;

    fn attempts(&self) -> &Self::AttemptRepo {
        &self.attempts
    }
}

impl LockRepositoryProvider for SqliteRepositoryProvider {
    type LockRepo = SqliteAccountLockRepository;

    fn locks(&self) -> &Self::LockRepo {
        &self.locks
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        use crate::migrations::{
            CreateAccountsTable, CreateLoginAttemptIndexes, CreateLoginAttemptsTable,
            SqliteMigrationManager,
        };
        use vigil_migration::{Migration, MigrationManager};

        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager.initialize().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to initialize migrations");
            Error::Storage(StorageError::Migration(
                "Failed to initialize migrations".to_string(),
            ))
        })?;

        let migrations: Vec<Box<dyn Migration<_>>> = vec![
            Box::new(CreateAccountsTable),
            Box::new(CreateLoginAttemptsTable),
            Box::new(CreateLoginAttemptIndexes),
        ];
        manager.up(&migrations).await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            Error::Storage(StorageError::Migration(
                "Failed to run migrations".to_string(),
            ))
        })?;

        Ok(())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| Error::Storage(StorageError::Database(e.to_string())))?;
        Ok(())
    }
}
