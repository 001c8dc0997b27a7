//! Service layer for business logic
//!
//! This module contains the concrete services that implement the guard's
//! decision logic and outcome recording over the repository traits.

pub mod guard;
pub mod recorder;

pub use guard::BruteForceGuard;
pub use recorder::AttemptRecorder;
