//! crates/reading_tracker_core/src/domain.rs
//!
//! Defines the core data structures for the application: the per-user profile
//! document and everything embedded in it. These are serialized as a single
//! JSON document by the storage adapter and as camelCase JSON by the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Note text the finish-book flow has always written to the reading log.
pub const BOOK_FINISHED_NOTE: &str = "Book Finished";
/// Note text the start-book flow has always written to the reading log.
pub const BOOK_STARTED_NOTE: &str = "Book Started";

//=========================================================================================
// Reading Challenges
//=========================================================================================

/// The unit a challenge target is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeType {
    Books,
    Pages,
}

impl ChallengeType {
    pub fn unit_label(self) -> &'static str {
        match self {
            ChallengeType::Books => "books",
            ChallengeType::Pages => "pages",
        }
    }
}

/// The cadence a challenge's pace is expressed in.
///
/// A timeframe does not bound the challenge; the start and end dates do. It
/// only selects the time unit used for pace: a yearly challenge is paced per
/// month, a monthly one per week and a weekly one per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeFrame {
    Week,
    Month,
    Year,
}

impl TimeFrame {
    /// Number of hours in one pace unit. Months are a flat 30 days.
    pub fn hours_per_unit(self) -> f64 {
        match self {
            TimeFrame::Year => 24.0 * 30.0,
            TimeFrame::Month => 24.0 * 7.0,
            TimeFrame::Week => 24.0,
        }
    }

    pub fn unit_label(self) -> &'static str {
        match self {
            TimeFrame::Year => "month",
            TimeFrame::Month => "week",
            TimeFrame::Week => "day",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChallengeStatus {
    Ahead,
    Behind,
    #[default]
    OnTrack,
}

/// Pace figures for a challenge, all in `unit`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ChallengeRate {
    pub required: f64,
    pub current_pace: f64,
    /// Distance from the expected position. Always non-negative; the direction
    /// is carried by `status`.
    pub schedule_diff: f64,
    pub unit: String,
    pub status: ChallengeStatus,
}

/// The last computed progress of a challenge. Derived from the reading log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ChallengeProgress {
    pub current: i64,
    /// Unclamped, so an overachieved challenge reports more than 100.
    pub percentage: f64,
    /// `percentage` clamped to `[0, 100]` for display.
    pub display_percentage: f64,
    pub rate: ChallengeRate,
}

impl ChallengeProgress {
    pub fn is_complete(&self) -> bool {
        self.percentage >= 100.0
    }
}

/// A user's declared reading goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadingChallenge {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub challenge_type: ChallengeType,
    #[serde(rename = "timeframe")]
    pub time_frame: TimeFrame,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub target: i64,
    #[serde(default)]
    pub progress: ChallengeProgress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//=========================================================================================
// Reading Log
//=========================================================================================

/// What a reading-log entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogEntryKind {
    Started,
    Progress,
    Finished,
    Removed,
}

impl LogEntryKind {
    /// Derives the kind of an entry written before entries carried one.
    pub fn from_legacy_notes(notes: &str) -> Self {
        match notes {
            BOOK_FINISHED_NOTE => LogEntryKind::Finished,
            BOOK_STARTED_NOTE => LogEntryKind::Started,
            _ => LogEntryKind::Progress,
        }
    }
}

/// One entry in a user's reading history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadingLogItem {
    pub id: Uuid,
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book_thumbnail: Option<String>,
    /// Page delta for this entry. Zero or negative values are legitimate.
    #[serde(default)]
    pub pages_read: i64,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<LogEntryKind>,
}

impl ReadingLogItem {
    pub fn effective_kind(&self) -> LogEntryKind {
        self.kind
            .unwrap_or_else(|| LogEntryKind::from_legacy_notes(&self.notes))
    }
}

//=========================================================================================
// Shelves
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct BookProgress {
    pub last_page_read: i64,
    pub percentage: f64,
    pub last_updated: Option<DateTime<Utc>>,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<i64>,
    #[serde(default)]
    pub progress: BookProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct CurrentlyReadingItem {
    pub book: Book,
    pub started_date: DateTime<Utc>,
}

/// A finished book.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct ReadItem {
    pub book_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub completed_date: DateTime<Utc>,
}

//=========================================================================================
// Profile
//=========================================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileInformation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The whole per-user document. Every write replaces it as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: Uuid,
    #[serde(default)]
    pub profile_information: ProfileInformation,
    #[serde(default)]
    pub currently_reading: Vec<CurrentlyReadingItem>,
    #[serde(default)]
    pub read: Vec<ReadItem>,
    #[serde(default)]
    pub reading_log: Vec<ReadingLogItem>,
    #[serde(default)]
    pub challenges: Vec<ReadingChallenge>,
    /// Store-managed write version. Zero means the profile was never saved.
    #[serde(skip)]
    pub version: i64,
}

impl Profile {
    /// An empty, never-saved profile for `user_id`.
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            profile_information: ProfileInformation::default(),
            currently_reading: Vec::new(),
            read: Vec::new(),
            reading_log: Vec::new(),
            challenges: Vec::new(),
            version: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_entries_derive_kind_from_notes() {
        let entry: ReadingLogItem = serde_json::from_value(serde_json::json!({
            "id": "6f1c2b7e-8d0a-4c3e-9a51-0b6b9d1d7e10",
            "bookId": "OL123W",
            "date": "2024-02-01T00:00:00Z",
            "notes": "Book Finished"
        }))
        .unwrap();

        assert_eq!(entry.kind, None);
        assert_eq!(entry.pages_read, 0);
        assert_eq!(entry.effective_kind(), LogEntryKind::Finished);
    }

    #[test]
    fn test_explicit_kind_wins_over_notes() {
        let entry: ReadingLogItem = serde_json::from_value(serde_json::json!({
            "id": "6f1c2b7e-8d0a-4c3e-9a51-0b6b9d1d7e10",
            "bookId": "OL123W",
            "date": "2024-02-01T00:00:00Z",
            "notes": "Book Finished",
            "kind": "PROGRESS"
        }))
        .unwrap();

        assert_eq!(entry.effective_kind(), LogEntryKind::Progress);
        assert_eq!(LogEntryKind::from_legacy_notes("Book Started"), LogEntryKind::Started);
        assert_eq!(LogEntryKind::from_legacy_notes("chapter 3"), LogEntryKind::Progress);
    }

    #[test]
    fn test_challenge_json_shape() {
        let value = serde_json::json!({
            "id": "0b9c7f5e-1f25-4a0e-8f5b-3b8d8d6c2a11",
            "userId": "5a4e3f0c-2b1d-4c9e-8a7f-6e5d4c3b2a19",
            "name": "2024 books",
            "type": "BOOKS",
            "timeframe": "YEAR",
            "startDate": "2024-01-01T00:00:00Z",
            "endDate": "2024-12-31T00:00:00Z",
            "target": 12,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-01T00:00:00Z"
        });
        let challenge: ReadingChallenge = serde_json::from_value(value).unwrap();

        assert_eq!(challenge.challenge_type, ChallengeType::Books);
        assert_eq!(challenge.time_frame, TimeFrame::Year);
        assert_eq!(challenge.progress.rate.status, ChallengeStatus::OnTrack);

        let out = serde_json::to_value(&challenge).unwrap();
        assert_eq!(out["progress"]["rate"]["status"], "ON_TRACK");
        assert!(out["progress"]["rate"].get("currentPace").is_some());
    }

    #[test]
    fn test_unknown_challenge_type_is_rejected() {
        let result = serde_json::from_str::<ChallengeType>("\"CHAPTERS\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_version_is_not_serialized() {
        let mut profile = Profile::new(Uuid::new_v4());
        profile.version = 7;

        let out = serde_json::to_value(&profile).unwrap();
        assert!(out.get("version").is_none());

        let back: Profile = serde_json::from_value(out).unwrap();
        assert_eq!(back.version, 0);
    }
}
