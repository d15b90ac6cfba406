//! crates/reading_tracker_core/src/currently_reading.rs
//!
//! The "currently reading" shelf. Starting, advancing, finishing and removing
//! a book each append a tagged entry to the reading log, which is what the
//! challenge engine aggregates.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    Book, BookProgress, CurrentlyReadingItem, LogEntryKind, ReadItem, ReadingLogItem,
    BOOK_FINISHED_NOTE, BOOK_STARTED_NOTE,
};
use crate::engine::refresh_all_challenges;
use crate::service::{ServiceContext, ServiceError, ServiceResult};

const BOOK_REMOVED_NOTE: &str = "Book Removed";

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StartReading {
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub total_pages: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub current_page: i64,
    #[serde(default)]
    pub notes: String,
    /// Defaults to now.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

fn log_entry(
    book: &Book,
    date: DateTime<Utc>,
    pages_read: i64,
    notes: &str,
    kind: LogEntryKind,
) -> ReadingLogItem {
    ReadingLogItem {
        id: Uuid::new_v4(),
        book_id: book.book_id.clone(),
        title: book.title.clone(),
        date,
        book_thumbnail: book.thumbnail.clone(),
        pages_read,
        notes: notes.to_string(),
        kind: Some(kind),
    }
}

fn not_on_shelf(book_id: &str) -> ServiceError {
    ServiceError::NotFound(format!("book {} is not currently being read", book_id))
}

#[derive(Clone)]
pub struct CurrentlyReadingService {
    ctx: ServiceContext,
}

impl CurrentlyReadingService {
    pub fn new(ctx: ServiceContext) -> Self {
        Self { ctx }
    }

    pub async fn list(&self, user_id: Uuid) -> ServiceResult<Vec<CurrentlyReadingItem>> {
        Ok(self.ctx.load(user_id).await?.currently_reading)
    }

    pub async fn start(
        &self,
        user_id: Uuid,
        params: StartReading,
    ) -> ServiceResult<CurrentlyReadingItem> {
        if params.book_id.trim().is_empty() {
            return Err(ServiceError::Validation("bookId must not be empty".to_string()));
        }
        if matches!(params.total_pages, Some(pages) if pages <= 0) {
            return Err(ServiceError::Validation("totalPages must be positive".to_string()));
        }

        let item = self
            .ctx
            .modify(user_id, |profile, now| {
                if profile
                    .currently_reading
                    .iter()
                    .any(|item| item.book.book_id == params.book_id)
                {
                    return Err(ServiceError::Validation(format!(
                        "book {} is already being read",
                        params.book_id
                    )));
                }

                let item = CurrentlyReadingItem {
                    book: Book {
                        book_id: params.book_id.clone(),
                        title: params.title.clone(),
                        authors: params.authors.clone(),
                        thumbnail: params.thumbnail.clone(),
                        total_pages: params.total_pages,
                        progress: BookProgress::default(),
                    },
                    started_date: now,
                };
                profile.reading_log.push(log_entry(
                    &item.book,
                    now,
                    0,
                    BOOK_STARTED_NOTE,
                    LogEntryKind::Started,
                ));
                profile.currently_reading.push(item.clone());
                refresh_all_challenges(profile, now);
                Ok(item)
            })
            .await?;

        info!(%user_id, book_id = %item.book.book_id, "Started reading");
        Ok(item)
    }

    /// Moves the bookmark to `current_page` and logs the page delta.
    pub async fn update_progress(
        &self,
        user_id: Uuid,
        book_id: &str,
        update: ProgressUpdate,
    ) -> ServiceResult<CurrentlyReadingItem> {
        if update.current_page < 0 {
            return Err(ServiceError::Validation(format!(
                "currentPage must not be negative, got {}",
                update.current_page
            )));
        }

        self.ctx
            .modify(user_id, |profile, now| {
                let item = profile
                    .currently_reading
                    .iter_mut()
                    .find(|item| item.book.book_id == book_id)
                    .ok_or_else(|| not_on_shelf(book_id))?;

                if let Some(total) = item.book.total_pages {
                    if update.current_page > total {
                        return Err(ServiceError::Validation(format!(
                            "currentPage {} is past the last page {}",
                            update.current_page, total
                        )));
                    }
                }

                let progress = &mut item.book.progress;
                let pages_read = update.current_page - progress.last_page_read;
                progress.last_page_read = update.current_page;
                progress.last_updated = Some(now);
                progress.notes = update.notes.clone();
                if let Some(total) = item.book.total_pages {
                    progress.percentage = update.current_page as f64 * 100.0 / total as f64;
                }

                let entry = log_entry(
                    &item.book,
                    update.date.unwrap_or(now),
                    pages_read,
                    &update.notes,
                    LogEntryKind::Progress,
                );
                let updated = item.clone();
                profile.reading_log.push(entry);
                refresh_all_challenges(profile, now);
                Ok(updated)
            })
            .await
    }

    /// Moves the book to the read shelf. Pages between the bookmark and the
    /// last page, when known, are logged with the finish entry.
    pub async fn finish(&self, user_id: Uuid, book_id: &str) -> ServiceResult<ReadItem> {
        let read = self
            .ctx
            .modify(user_id, |profile, now| {
                let index = profile
                    .currently_reading
                    .iter()
                    .position(|item| item.book.book_id == book_id)
                    .ok_or_else(|| not_on_shelf(book_id))?;
                let item = profile.currently_reading.remove(index);
                let book = item.book;

                let remaining = book
                    .total_pages
                    .map(|total| (total - book.progress.last_page_read).max(0))
                    .unwrap_or(0);
                profile.reading_log.push(log_entry(
                    &book,
                    now,
                    remaining,
                    BOOK_FINISHED_NOTE,
                    LogEntryKind::Finished,
                ));

                let read = ReadItem {
                    book_id: book.book_id,
                    title: book.title,
                    authors: book.authors,
                    thumbnail: book.thumbnail,
                    completed_date: now,
                };
                profile.read.push(read.clone());
                refresh_all_challenges(profile, now);
                Ok(read)
            })
            .await?;

        info!(%user_id, %book_id, "Finished reading");
        Ok(read)
    }

    pub async fn remove(&self, user_id: Uuid, book_id: &str) -> ServiceResult<()> {
        self.ctx
            .modify(user_id, |profile, now| {
                let index = profile
                    .currently_reading
                    .iter()
                    .position(|item| item.book.book_id == book_id)
                    .ok_or_else(|| not_on_shelf(book_id))?;
                let item = profile.currently_reading.remove(index);
                profile.reading_log.push(log_entry(
                    &item.book,
                    now,
                    0,
                    BOOK_REMOVED_NOTE,
                    LogEntryKind::Removed,
                ));
                refresh_all_challenges(profile, now);
                Ok(())
            })
            .await?;

        info!(%user_id, %book_id, "Removed from currently reading");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChallengeProgress, ChallengeType, ReadingChallenge, TimeFrame};
    use crate::memory::{FixedClock, InMemoryProfileStore};
    use crate::ports::ProfileStore;
    use crate::service::ServiceConfig;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 0, 0, 0).unwrap()
    }

    fn setup() -> (CurrentlyReadingService, InMemoryProfileStore, Arc<FixedClock>) {
        let store = InMemoryProfileStore::new();
        let clock = Arc::new(FixedClock::new(utc(2024, 3, 1)));
        let ctx = ServiceContext::new(
            Arc::new(store.clone()),
            clock.clone(),
            ServiceConfig::default(),
        );
        (CurrentlyReadingService::new(ctx), store, clock)
    }

    async fn seed_challenges(store: &InMemoryProfileStore, user_id: Uuid) {
        let mut profile = store.load_profile(user_id).await.unwrap();
        for (challenge_type, target) in [(ChallengeType::Books, 2), (ChallengeType::Pages, 600)] {
            profile.challenges.push(ReadingChallenge {
                id: Uuid::new_v4(),
                user_id,
                name: format!("{:?} in March", challenge_type),
                challenge_type,
                time_frame: TimeFrame::Month,
                start_date: utc(2024, 3, 1),
                end_date: utc(2024, 3, 31),
                target,
                progress: ChallengeProgress::default(),
                created_at: utc(2024, 3, 1),
                updated_at: utc(2024, 3, 1),
            });
        }
        store.save_profile(&profile).await.unwrap();
    }

    fn book(book_id: &str, total_pages: Option<i64>) -> StartReading {
        StartReading {
            book_id: book_id.to_string(),
            title: "The Left Hand of Darkness".to_string(),
            authors: vec!["Ursula K. Le Guin".to_string()],
            thumbnail: None,
            total_pages,
        }
    }

    fn page(current_page: i64) -> ProgressUpdate {
        ProgressUpdate {
            current_page,
            notes: String::new(),
            date: None,
        }
    }

    #[tokio::test]
    async fn test_reading_a_book_end_to_end() {
        let (service, store, clock) = setup();
        let user_id = Uuid::new_v4();
        seed_challenges(&store, user_id).await;

        service.start(user_id, book("OL1W", Some(300))).await.unwrap();
        clock.advance(Duration::days(2));
        service.update_progress(user_id, "OL1W", page(120)).await.unwrap();
        clock.advance(Duration::days(2));
        let item = service.update_progress(user_id, "OL1W", page(200)).await.unwrap();
        assert_eq!(item.book.progress.last_page_read, 200);
        assert!((item.book.progress.percentage - 66.67).abs() < 0.01);

        clock.advance(Duration::days(1));
        let read = service.finish(user_id, "OL1W").await.unwrap();
        assert_eq!(read.completed_date, utc(2024, 3, 6));

        let profile = store.load_profile(user_id).await.unwrap();
        assert!(profile.currently_reading.is_empty());
        assert_eq!(profile.read.len(), 1);

        let kinds: Vec<_> = profile.reading_log.iter().map(|e| e.effective_kind()).collect();
        assert_eq!(
            kinds,
            vec![
                LogEntryKind::Started,
                LogEntryKind::Progress,
                LogEntryKind::Progress,
                LogEntryKind::Finished
            ]
        );
        let pages: Vec<_> = profile.reading_log.iter().map(|e| e.pages_read).collect();
        assert_eq!(pages, vec![0, 120, 80, 100]);

        assert_eq!(profile.challenges[0].progress.current, 1);
        assert_eq!(profile.challenges[1].progress.current, 300);
        assert_eq!(profile.challenges[1].updated_at, utc(2024, 3, 6));
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let (service, _, _) = setup();
        let user_id = Uuid::new_v4();

        service.start(user_id, book("OL2W", None)).await.unwrap();
        let again = service.start(user_id, book("OL2W", None)).await;

        assert!(matches!(again, Err(ServiceError::Validation(_))));
        assert_eq!(service.list(user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_validation() {
        let (service, _, _) = setup();
        let user_id = Uuid::new_v4();
        service.start(user_id, book("OL3W", Some(100))).await.unwrap();

        let negative = service.update_progress(user_id, "OL3W", page(-1)).await;
        let past_end = service.update_progress(user_id, "OL3W", page(101)).await;
        let unknown = service.update_progress(user_id, "OL9W", page(10)).await;

        assert!(matches!(negative, Err(ServiceError::Validation(_))));
        assert!(matches!(past_end, Err(ServiceError::Validation(_))));
        assert!(matches!(unknown, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_removed_book_is_not_counted_as_finished() {
        let (service, store, _) = setup();
        let user_id = Uuid::new_v4();
        seed_challenges(&store, user_id).await;

        service.start(user_id, book("OL4W", None)).await.unwrap();
        service.update_progress(user_id, "OL4W", page(40)).await.unwrap();
        service.remove(user_id, "OL4W").await.unwrap();

        let profile = store.load_profile(user_id).await.unwrap();
        assert!(profile.currently_reading.is_empty());
        assert!(profile.read.is_empty());
        assert_eq!(
            profile.reading_log.last().map(|e| e.effective_kind()),
            Some(LogEntryKind::Removed)
        );
        assert_eq!(profile.challenges[0].progress.current, 0);
        assert_eq!(profile.challenges[1].progress.current, 40);

        let missing = service.finish(user_id, "OL4W").await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
    }
}
