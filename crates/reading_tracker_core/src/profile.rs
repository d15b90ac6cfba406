//! crates/reading_tracker_core/src/profile.rs

use tracing::debug;
use uuid::Uuid;

use crate::domain::{ChallengeProgress, Profile};
use crate::engine::refresh_all_challenges;
use crate::service::{ServiceContext, ServiceResult};

#[derive(Clone)]
pub struct ProfileService {
    ctx: ServiceContext,
}

fn progress_snapshot(profile: &Profile) -> Vec<ChallengeProgress> {
    profile
        .challenges
        .iter()
        .map(|c| c.progress.clone())
        .collect()
}

impl ProfileService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Returns the profile with every open challenge recomputed.
    ///
    /// The refreshed profile is only written back when some challenge's
    /// progress actually moved; a refresh that only bumps `updated_at` is not
    /// worth a write.
    pub async fn get_profile(&self, user_id: Uuid) -> ServiceResult<Profile> {
        let mut profile = self.ctx.load(user_id).await?;
        let before = progress_snapshot(&profile);
        let refreshed = refresh_all_challenges(&mut profile, self.ctx.now());
        if refreshed == 0 || progress_snapshot(&profile) == before {
            return Ok(profile);
        }

        debug!(%user_id, refreshed, "Persisting refreshed challenge progress");
        self.ctx
            .modify(user_id, |profile, now| {
                refresh_all_challenges(profile, now);
                Ok(profile.clone())
            })
            .await
    }
}
