//! Core functionality for the vigil login guard
//!
//! This crate contains the domain types, repository traits, and services that
//! make up the brute-force detection and account-lockout core. It is designed
//! to be used through a storage backend crate and the `vigil` facade rather
//! than directly by application code.
//!
//! The decision logic never keeps counters in memory: every check is derived
//! fresh from the append-only attempt ledger, so decisions survive process
//! restarts and concurrent handlers without coordination.
//!
//! See [`BruteForceGuard`] for the pre/post-authentication decision points,
//! [`AttemptRecorder`] for outcome recording, and [`LockoutPolicy`] for the
//! thresholds that drive both.

pub mod error;
pub mod policy;
pub mod repositories;
pub mod services;
pub mod storage;
pub mod validation;

pub use error::{AuthError, Error, StorageError};
pub use policy::LockoutPolicy;
pub use repositories::RepositoryProvider;
pub use services::{AttemptRecorder, BruteForceGuard};
pub use storage::{LockState, LoginAttempt};
