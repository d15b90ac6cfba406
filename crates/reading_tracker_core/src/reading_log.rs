//! crates/reading_tracker_core/src/reading_log.rs
//!
//! Direct edits to the reading log. Every write refreshes the profile's
//! challenges in the same profile write.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::{LogEntryKind, ReadingLogItem};
use crate::engine::refresh_all_challenges;
use crate::service::{ServiceContext, ServiceError, ServiceResult};

/// Largest page delta a single entry may record, in either direction.
pub const MAX_PAGES_PER_ENTRY: i64 = 100_000;

fn validate_pages_read(pages_read: i64) -> ServiceResult<()> {
    if pages_read.unsigned_abs() > MAX_PAGES_PER_ENTRY as u64 {
        return Err(ServiceError::Validation(format!(
            "pagesRead must be within {} pages either way, got {}",
            MAX_PAGES_PER_ENTRY, pages_read
        )));
    }
    Ok(())
}

fn entry_not_found(entry_id: Uuid) -> ServiceError {
    ServiceError::NotFound(format!("reading log entry {}", entry_id))
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct NewLogEntry {
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub book_thumbnail: Option<String>,
    #[serde(default)]
    pub pages_read: i64,
    #[serde(default)]
    pub notes: String,
    /// Defaults to now.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Derived from `notes` when absent.
    #[serde(default)]
    pub kind: Option<LogEntryKind>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LogEntryChanges {
    pub pages_read: Option<i64>,
    pub notes: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct ReadingLogService {
    ctx: ServiceContext,
}

impl ReadingLogService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<ReadingLogItem>> {
        Ok(self.ctx.load(user_id).await?.reading_log)
    }

    pub async fn create(
        &self,
        user_id: Uuid,
        params: NewLogEntry,
    ) -> ServiceResult<ReadingLogItem> {
        if params.book_id.trim().is_empty() {
            return Err(ServiceError::Validation("bookId must not be empty".to_string()));
        }
        validate_pages_read(params.pages_read)?;
        let kind = params
            .kind
            .unwrap_or_else(|| LogEntryKind::from_legacy_notes(&params.notes));
        let id = Uuid::new_v4();

        let entry = self
            .ctx
            .modify(user_id, |profile, now| {
                let entry = ReadingLogItem {
                    id,
                    book_id: params.book_id.clone(),
                    title: params.title.clone(),
                    date: params.date.unwrap_or(now),
                    book_thumbnail: params.book_thumbnail.clone(),
                    pages_read: params.pages_read,
                    notes: params.notes.clone(),
                    kind: Some(kind),
                };
                profile.reading_log.push(entry.clone());
                refresh_all_challenges(profile, now);
                Ok(entry)
            })
            .await?;

        info!(%user_id, entry_id = %entry.id, ?kind, "Reading log entry created");
        Ok(entry)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        entry_id: Uuid,
        changes: LogEntryChanges,
    ) -> ServiceResult<ReadingLogItem> {
        if let Some(pages_read) = changes.pages_read {
            validate_pages_read(pages_read)?;
        }

        self.ctx
            .modify(user_id, |profile, now| {
                let entry = profile
                    .reading_log
                    .iter_mut()
                    .find(|e| e.id == entry_id)
                    .ok_or_else(|| entry_not_found(entry_id))?;

                if let Some(pages_read) = changes.pages_read {
                    entry.pages_read = pages_read;
                }
                if let Some(notes) = &changes.notes {
                    entry.notes = notes.clone();
                }
                if let Some(date) = changes.date {
                    entry.date = date;
                }
                let updated = entry.clone();

                refresh_all_challenges(profile, now);
                Ok(updated)
            })
            .await
    }

    pub async fn delete(&self, user_id: Uuid, entry_id: Uuid) -> ServiceResult<()> {
        self.ctx
            .modify(user_id, |profile, now| {
                let index = profile
                    .reading_log
                    .iter()
                    .position(|e| e.id == entry_id)
                    .ok_or_else(|| entry_not_found(entry_id))?;
                profile.reading_log.remove(index);
                refresh_all_challenges(profile, now);
                Ok(())
            })
            .await?;

        info!(%user_id, %entry_id, "Reading log entry deleted");
        Ok(())
    }
}
