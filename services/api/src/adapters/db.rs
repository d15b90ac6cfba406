//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `ProfileStore` port from the `core` crate. Each profile is one JSONB
//! document keyed by user id, guarded by a version column for conditional writes.

use async_trait::async_trait;
use reading_tracker_core::domain::Profile;
use reading_tracker_core::ports::{PortError, PortResult, ProfileStore};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `ProfileStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct ProfileRecord {
    user_id: Uuid,
    document: Json<Profile>,
    version: i64,
}
impl ProfileRecord {
    fn to_domain(self) -> Profile {
        let mut profile = self.document.0;
        // The row key is authoritative over whatever the document says.
        profile.user_id = self.user_id;
        profile.version = self.version;
        profile
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `ProfileStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl ProfileStore for DbAdapter {
    async fn load_profile(&self, user_id: Uuid) -> PortResult<Profile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT user_id, document, version FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(match record {
            Some(record) => record.to_domain(),
            None => Profile::new(user_id),
        })
    }

    async fn save_profile(&self, profile: &Profile) -> PortResult<()> {
        let document = Json(profile);

        let result = if profile.version == 0 {
            sqlx::query(
                "INSERT INTO profiles (user_id, document, version) VALUES ($1, $2, 1) \
                 ON CONFLICT (user_id) DO NOTHING",
            )
            .bind(profile.user_id)
            .bind(document)
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                "UPDATE profiles SET document = $2, version = version + 1, updated_at = now() \
                 WHERE user_id = $1 AND version = $3",
            )
            .bind(profile.user_id)
            .bind(document)
            .bind(profile.version)
            .execute(&self.pool)
            .await
        }
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::Conflict(format!(
                "profile {} changed since version {}",
                profile.user_id, profile.version
            )));
        }

        debug!(user_id = %profile.user_id, version = profile.version + 1, "Profile written");
        Ok(())
    }
}
