//! Repository traits for data access layer
//!
//! This module defines the repository interfaces that services use to interact
//! with storage. These traits provide a clean abstraction over the underlying
//! storage implementation.
//!
//! # Trait Hierarchy
//!
//! The repository system uses a composable trait hierarchy:
//!
//! - Individual `*Repository` traits define the operations for each data domain
//! - Individual `*RepositoryProvider` traits provide access to each repository type
//! - [`RepositoryProvider`] is a supertrait combining all provider traits plus
//!   lifecycle methods
//!
//! This design allows storage backends to implement each repository once and
//! expose them through a unified interface.

pub mod adapter;
pub mod attempt;
pub mod lock;

pub use adapter::{AttemptRepositoryAdapter, LockRepositoryAdapter};
pub use attempt::LoginAttemptRepository;
pub use lock::AccountLockRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for attempt ledger access.
pub trait AttemptRepositoryProvider: Send + Sync + 'static {
    /// The attempt ledger implementation type
    type AttemptRepo: LoginAttemptRepository;

    /// Get the attempt ledger repository
    fn attempts(&self) -> &Self::AttemptRepo;
}

/// Provider trait for account lock repository access.
pub trait LockRepositoryProvider: Send + Sync + 'static {
    /// The account lock repository implementation type
    type LockRepo: AccountLockRepository;

    /// Get the account lock repository
    fn locks(&self) -> &Self::LockRepo;
}

/// Provider trait that storage implementations must implement to provide all
/// repositories, plus lifecycle methods for migrations and health checks.
///
/// # Implementing a Custom Storage Backend
///
/// ```rust,ignore
/// use vigil_core::repositories::*;
///
/// struct MyStorage { /* ... */ }
///
/// impl AttemptRepositoryProvider for MyStorage {
///     type AttemptRepo = MyAttemptRepository;
///     fn attempts(&self) -> &Self::AttemptRepo { &self.attempts }
/// }
///
/// impl LockRepositoryProvider for MyStorage {
///     type LockRepo = MyLockRepository;
///     fn locks(&self) -> &Self::LockRepo { &self.locks }
/// }
///
/// #[async_trait]
/// impl RepositoryProvider for MyStorage {
///     async fn migrate(&self) -> Result<(), Error> { /* ... */ }
///     async fn health_check(&self) -> Result<(), Error> { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait RepositoryProvider: AttemptRepositoryProvider + LockRepositoryProvider {
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
