//! SQLite storage backend for the vigil login guard.
//!
//! Provides [`SqliteRepositoryProvider`], an implementation of
//! `vigil_core::RepositoryProvider` backed by a `sqlx::SqlitePool`, together
//! with the schema migrations it needs. Timestamps are stored as unix epoch
//! integers.

pub mod migrations;
pub mod repositories;

pub use repositories::{
    SqliteAccountLockRepository, SqliteLoginAttemptRepository, SqliteRepositoryProvider,
};
