//! crates/reading_tracker_core/src/memory.rs
//!
//! In-memory implementations of the ports, for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::Profile;
use crate::ports::{Clock, PortError, PortResult, ProfileStore};

/// A `ProfileStore` backed by a map, with the same version check as the
/// database adapter.
#[derive(Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: Arc<Mutex<HashMap<Uuid, Profile>>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<Uuid, Profile>>> {
        self.profiles
            .lock()
            .map_err(|_| PortError::Unexpected("profile map lock poisoned".to_string()))
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn load_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        let profiles = self.lock()?;
        Ok(profiles
            .get(&user_id)
            .cloned()
            .unwrap_or_else(|| Profile::new(user_id)))
    }

    async fn save_profile(&self, profile: &Profile) -> PortResult<()> {
        let mut profiles = self.lock()?;
        let stored_version = profiles.get(&profile.user_id).map_or(0, |p| p.version);
        if stored_version != profile.version {
            return Err(PortError::Conflict(format!(
                "profile {} is at version {}, write was based on {}",
                profile.user_id, stored_version, profile.version
            )));
        }

        let mut saved = profile.clone();
        saved.version = stored_version + 1;
        profiles.insert(profile.user_id, saved);
        Ok(())
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = *guard + by;
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[tokio::test]
    async fn test_unknown_user_gets_fresh_profile() {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();

        let profile = store.load_profile(user_id).await.unwrap();

        assert_eq!(profile, Profile::new(user_id));
    }

    #[tokio::test]
    async fn test_stale_write_is_rejected() {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();

        let first = store.load_profile(user_id).await.unwrap();
        let second = store.load_profile(user_id).await.unwrap();

        store.save_profile(&first).await.unwrap();
        let result = store.save_profile(&second).await;

        assert!(matches!(result, Err(PortError::Conflict(_))));
        assert_eq!(store.load_profile(user_id).await.unwrap().version, 1);
    }

    #[test]
    fn test_fixed_clock_advances() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock = FixedClock::new(start);

        clock.advance(Duration::days(2));
        assert_eq!(clock.now(), start + Duration::days(2));

        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
