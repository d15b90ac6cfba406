//! crates/reading_tracker_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or clocks.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::Profile;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A conditional write lost against a concurrent writer.
    #[error("Write conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Whole-document storage for user profiles.
///
/// Writes are conditional on `Profile::version`: a save succeeds only if the
/// stored version still equals the version the profile was loaded with.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Loads the profile for `user_id`, or a fresh `Profile::new` with
    /// version 0 if the user has never been saved.
    async fn load_profile(&self, user_id: Uuid) -> PortResult<Profile>;

    /// Persists `profile`. Returns `PortError::Conflict` if the stored version
    /// moved since `profile` was loaded.
    async fn save_profile(&self, profile: &Profile) -> PortResult<()>;
}

/// Source of the current time. Never read implicitly by the engine.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
