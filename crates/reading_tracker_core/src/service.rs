//! crates/reading_tracker_core/src/service.rs
//!
//! Plumbing shared by the orchestration services: the service error type and
//! the read-modify-write cycle around the profile store.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::Profile;
use crate::ports::{Clock, PortError, ProfileStore};

/// Errors surfaced by the orchestration services.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Caller-supplied input broke a precondition.
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Settings for the orchestration services.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How many times a conflicting profile write is retried before giving up.
    pub max_write_retries: u32,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_write_retries: 3,
        }
    }
}

/// The collaborators every service works through.
#[derive(Clone)]
pub struct ServiceContext {
    store: Arc<dyn ProfileStore>,
    clock: Arc<dyn Clock>,
    config: ServiceConfig,
}

impl ServiceContext {
    pub fn new(store: Arc<dyn ProfileStore>, clock: Arc<dyn Clock>, config: ServiceConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub async fn load(&self, user_id: Uuid) -> ServiceResult<Profile> {
        Ok(self.store.load_profile(user_id).await?)
    }

    /// Loads the profile, applies `mutate` and writes it back.
    ///
    /// When the write loses against a concurrent writer the whole cycle runs
    /// again on a fresh copy, so `mutate` may be called more than once. An
    /// error from `mutate` aborts without writing.
    pub async fn modify<T, F>(&self, user_id: Uuid, mut mutate: F) -> ServiceResult<T>
    where
        F: FnMut(&mut Profile, DateTime<Utc>) -> ServiceResult<T> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            let mut profile = self.store.load_profile(user_id).await?;
            let output = mutate(&mut profile, self.clock.now())?;

            match self.store.save_profile(&profile).await {
                Ok(()) => {
                    debug!(%user_id, attempt, "Profile saved");
                    return Ok(output);
                }
                Err(PortError::Conflict(reason)) if attempt < self.config.max_write_retries => {
                    attempt += 1;
                    warn!(%user_id, attempt, %reason, "Profile write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
