//! crates/reading_tracker_core/src/challenges.rs
//!
//! Challenge lifecycle: validation at the boundary, then the engine.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::{ChallengeProgress, ChallengeType, ReadingChallenge, TimeFrame};
use crate::engine::{compute_required_rate, recompute, refresh_all_challenges};
use crate::service::{ServiceContext, ServiceError, ServiceResult};

/// Parameters for a new challenge.
#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewChallenge {
    pub name: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    #[serde(rename = "timeframe")]
    pub time_frame: TimeFrame,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub target: i64,
}

/// Fields a client may change on an existing challenge. Progress is not one
/// of them: it is always recomputed from the reading log.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ChallengeChanges {
    pub name: Option<String>,
    pub target: Option<i64>,
    pub end_date: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub challenge_type: Option<ChallengeType>,
    #[serde(rename = "timeframe")]
    pub time_frame: Option<TimeFrame>,
}

impl ChallengeChanges {
    fn apply(&self, challenge: &mut ReadingChallenge) {
        if let Some(name) = &self.name {
            challenge.name = name.clone();
        }
        if let Some(target) = self.target {
            challenge.target = target;
        }
        if let Some(end_date) = self.end_date {
            challenge.end_date = end_date;
        }
        if let Some(challenge_type) = self.challenge_type {
            challenge.challenge_type = challenge_type;
        }
        if let Some(time_frame) = self.time_frame {
            challenge.time_frame = time_frame;
        }
    }
}

fn validate(challenge: &ReadingChallenge) -> ServiceResult<()> {
    if challenge.name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "challenge name must not be empty".to_string(),
        ));
    }
    if challenge.target <= 0 {
        return Err(ServiceError::Validation(format!(
            "target must be positive, got {}",
            challenge.target
        )));
    }
    if challenge.end_date <= challenge.start_date {
        return Err(ServiceError::Validation(format!(
            "end date {} must be after start date {}",
            challenge.end_date, challenge.start_date
        )));
    }
    Ok(())
}

fn set_required_rate(challenge: &mut ReadingChallenge) {
    let (required, unit) = compute_required_rate(challenge);
    challenge.progress.rate.required = required;
    challenge.progress.rate.unit = unit;
}

#[derive(Clone)]
pub struct ChallengeService {
    ctx: ServiceContext,
}

impl ChallengeService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    /// Returns the user's challenges with freshly computed progress.
    pub async fn list_challenges(&self, user_id: Uuid) -> ServiceResult<Vec<ReadingChallenge>> {
        let mut profile = self.ctx.load(user_id).await?;
        refresh_all_challenges(&mut profile, self.ctx.now());
        Ok(profile.challenges)
    }

    pub async fn create_challenge(
        &self,
        user_id: Uuid,
        params: NewChallenge,
    ) -> ServiceResult<ReadingChallenge> {
        let now = self.ctx.now();
        let mut challenge = ReadingChallenge {
            id: Uuid::new_v4(),
            user_id,
            name: params.name,
            challenge_type: params.challenge_type,
            time_frame: params.time_frame,
            start_date: params.start_date,
            end_date: params.end_date,
            target: params.target,
            progress: ChallengeProgress::default(),
            created_at: now,
            updated_at: now,
        };
        validate(&challenge)?;
        set_required_rate(&mut challenge);

        let created = self
            .ctx
            .modify(user_id, |profile, now| {
                let mut created = challenge.clone();
                // A backdated challenge starts from the reading already logged.
                if created.start_date <= now {
                    created = recompute(created, &profile.reading_log, now);
                }
                profile.challenges.push(created.clone());
                Ok(created)
            })
            .await?;

        info!(%user_id, challenge_id = %created.id, "Challenge created");
        Ok(created)
    }

    pub async fn update_challenge(
        &self,
        user_id: Uuid,
        challenge_id: Uuid,
        changes: ChallengeChanges,
    ) -> ServiceResult<ReadingChallenge> {
        let updated = self
            .ctx
            .modify(user_id, |profile, now| {
                let log = &profile.reading_log;
                let challenge = profile
                    .challenges
                    .iter_mut()
                    .find(|c| c.id == challenge_id)
                    .ok_or_else(|| ServiceError::NotFound(format!("challenge {}", challenge_id)))?;

                let mut updated = challenge.clone();
                changes.apply(&mut updated);
                validate(&updated)?;
                set_required_rate(&mut updated);
                let updated = recompute(updated, log, now);

                *challenge = updated.clone();
                Ok(updated)
            })
            .await?;

        info!(%user_id, %challenge_id, "Challenge updated");
        Ok(updated)
    }

    pub async fn delete_challenge(&self, user_id: Uuid, challenge_id: Uuid) -> ServiceResult<()> {
        self.ctx
            .modify(user_id, |profile, _| {
                let index = profile
                    .challenges
                    .iter()
                    .position(|c| c.id == challenge_id)
                    .ok_or_else(|| ServiceError::NotFound(format!("challenge {}", challenge_id)))?;
                profile.challenges.remove(index);
                Ok(())
            })
            .await?;

        info!(%user_id, %challenge_id, "Challenge deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChallengeStatus, LogEntryKind, ReadingLogItem};
    use crate::memory::{FixedClock, InMemoryProfileStore};
    use crate::ports::ProfileStore;
    use crate::service::ServiceConfig;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn setup(now: DateTime<Utc>) -> (ChallengeService, InMemoryProfileStore, Arc<FixedClock>) {
        let store = InMemoryProfileStore::new();
        let clock = Arc::new(FixedClock::new(now));
        let ctx = ServiceContext::new(
            Arc::new(store.clone()),
            clock.clone(),
            ServiceConfig::default(),
        );
        (ChallengeService::new(ctx), store, clock)
    }

    async fn seed_log(
        store: &InMemoryProfileStore,
        user_id: Uuid,
        entries: Vec<(DateTime<Utc>, i64, LogEntryKind)>,
    ) {
        let mut profile = store.load_profile(user_id).await.unwrap();
        for (date, pages_read, kind) in entries {
            profile.reading_log.push(ReadingLogItem {
                id: Uuid::new_v4(),
                book_id: "OL7W".to_string(),
                title: "A Book".to_string(),
                date,
                book_thumbnail: None,
                pages_read,
                notes: String::new(),
                kind: Some(kind),
            });
        }
        store.save_profile(&profile).await.unwrap();
    }

    fn books_challenge(
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        target: i64,
    ) -> NewChallenge {
        NewChallenge {
            name: "Books this year".to_string(),
            challenge_type: ChallengeType::Books,
            time_frame: TimeFrame::Year,
            start_date,
            end_date,
            target,
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_parameters() {
        let (service, store, _) = setup(utc(2024, 1, 1));
        let user_id = Uuid::new_v4();
        let day = utc(2024, 2, 1);

        let cases = vec![
            books_challenge(day, day, 5),
            books_challenge(day, day - Duration::days(1), 5),
            books_challenge(day, utc(2024, 12, 31), 0),
            books_challenge(day, utc(2024, 12, 31), -3),
            NewChallenge {
                name: "   ".to_string(),
                ..books_challenge(day, utc(2024, 12, 31), 5)
            },
        ];

        for params in cases {
            let result = service.create_challenge(user_id, params).await;
            assert!(matches!(result, Err(ServiceError::Validation(_))));
        }
        assert_eq!(store.load_profile(user_id).await.unwrap().version, 0);
    }

    #[tokio::test]
    async fn test_create_future_challenge_starts_empty() {
        let (service, store, _) = setup(utc(2023, 12, 1));
        let user_id = Uuid::new_v4();

        let created = service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 12, 31), 12))
            .await
            .unwrap();

        assert_eq!(created.user_id, user_id);
        assert_eq!(created.created_at, utc(2023, 12, 1));
        assert_eq!(created.progress.current, 0);
        assert_eq!(created.progress.rate.required, 0.99);
        assert_eq!(created.progress.rate.unit, "books/month");
        assert_eq!(created.progress.rate.status, ChallengeStatus::OnTrack);

        let profile = store.load_profile(user_id).await.unwrap();
        assert_eq!(profile.challenges, vec![created]);
    }

    #[tokio::test]
    async fn test_create_backdated_challenge_counts_existing_log() {
        let (service, store, _) = setup(utc(2024, 4, 15));
        let user_id = Uuid::new_v4();
        seed_log(
            &store,
            user_id,
            vec![
                (utc(2023, 12, 20), 0, LogEntryKind::Finished),
                (utc(2024, 2, 1), 0, LogEntryKind::Finished),
                (utc(2024, 3, 1), 0, LogEntryKind::Finished),
                (utc(2024, 4, 1), 0, LogEntryKind::Finished),
                (utc(2024, 4, 2), 40, LogEntryKind::Progress),
            ],
        )
        .await;

        let created = service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 12, 31), 12))
            .await
            .unwrap();

        assert_eq!(created.progress.current, 3);
        assert_eq!(created.progress.percentage, 25.0);
        assert_eq!(created.updated_at, utc(2024, 4, 15));
    }

    #[tokio::test]
    async fn test_update_recomputes_rate_and_progress() {
        let (service, store, clock) = setup(utc(2024, 1, 1));
        let user_id = Uuid::new_v4();
        let created = service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 12, 31), 12))
            .await
            .unwrap();
        seed_log(&store, user_id, vec![(utc(2024, 3, 1), 0, LogEntryKind::Finished)]).await;
        clock.set(utc(2024, 3, 2));

        let changes: ChallengeChanges = serde_json::from_value(serde_json::json!({
            "target": 4,
            "name": "Fewer books",
            "current": 99
        }))
        .unwrap();
        let updated = service.update_challenge(user_id, created.id, changes).await.unwrap();

        assert_eq!(updated.name, "Fewer books");
        assert_eq!(updated.target, 4);
        assert_eq!(updated.progress.rate.required, 0.33);
        assert_eq!(updated.progress.current, 1);
        assert_eq!(updated.progress.percentage, 25.0);
        assert_eq!(updated.updated_at, utc(2024, 3, 2));
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_end_date() {
        let (service, store, _) = setup(utc(2024, 1, 1));
        let user_id = Uuid::new_v4();
        let created = service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 12, 31), 12))
            .await
            .unwrap();

        let changes = ChallengeChanges {
            end_date: Some(utc(2023, 6, 1)),
            ..ChallengeChanges::default()
        };
        let result = service.update_challenge(user_id, created.id, changes).await;

        assert!(matches!(result, Err(ServiceError::Validation(_))));
        let profile = store.load_profile(user_id).await.unwrap();
        assert_eq!(profile.challenges[0].end_date, utc(2024, 12, 31));
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_challenge() {
        let (service, _, _) = setup(utc(2024, 1, 1));
        let user_id = Uuid::new_v4();

        let update = service
            .update_challenge(user_id, Uuid::new_v4(), ChallengeChanges::default())
            .await;
        let delete = service.delete_challenge(user_id, Uuid::new_v4()).await;

        assert!(matches!(update, Err(ServiceError::NotFound(_))));
        assert!(matches!(delete, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_removes_challenge() {
        let (service, store, _) = setup(utc(2024, 1, 1));
        let user_id = Uuid::new_v4();
        let keep = service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 12, 31), 12))
            .await
            .unwrap();
        let gone = service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 6, 30), 6))
            .await
            .unwrap();

        service.delete_challenge(user_id, gone.id).await.unwrap();

        let profile = store.load_profile(user_id).await.unwrap();
        assert_eq!(profile.challenges.len(), 1);
        assert_eq!(profile.challenges[0].id, keep.id);
    }

    #[tokio::test]
    async fn test_list_reports_current_progress() {
        let (service, store, clock) = setup(utc(2024, 1, 1));
        let user_id = Uuid::new_v4();
        service
            .create_challenge(user_id, books_challenge(utc(2024, 1, 1), utc(2024, 12, 31), 12))
            .await
            .unwrap();
        seed_log(
            &store,
            user_id,
            vec![
                (utc(2024, 1, 10), 0, LogEntryKind::Finished),
                (utc(2024, 1, 20), 0, LogEntryKind::Finished),
            ],
        )
        .await;
        clock.set(utc(2024, 2, 1));

        let challenges = service.list_challenges(user_id).await.unwrap();

        assert_eq!(challenges[0].progress.current, 2);
        assert_eq!(challenges[0].progress.rate.status, ChallengeStatus::Ahead);
    }
}
