//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use reading_tracker_core::ports::{Clock, ProfileStore};
use reading_tracker_core::{
    ChallengeService, CurrentlyReadingService, ProfileService, ReadingLogService, ServiceConfig,
    ServiceContext,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub profiles: ProfileService,
    pub challenges: ChallengeService,
    pub reading_log: ReadingLogService,
    pub currently_reading: CurrentlyReadingService,
}

impl AppState {
    /// Wires every service to the same store and clock.
    pub fn new(store: Arc<dyn ProfileStore>, clock: Arc<dyn Clock>, config: Arc<Config>) -> Self {
        let ctx = ServiceContext::new(
            store,
            clock,
            ServiceConfig {
                max_write_retries: config.profile_write_retries,
            },
        );

        Self {
            config,
            profiles: ProfileService::new(ctx.clone()),
            challenges: ChallengeService::new(ctx.clone()),
            reading_log: ReadingLogService::new(ctx.clone()),
            currently_reading: CurrentlyReadingService::new(ctx),
        }
    }
}
