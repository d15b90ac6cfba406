pub mod challenges;
pub mod currently_reading;
pub mod domain;
pub mod engine;
pub mod memory;
pub mod ports;
pub mod profile;
pub mod reading_log;
pub mod service;

pub use challenges::{ChallengeChanges, ChallengeService, NewChallenge};
pub use currently_reading::{CurrentlyReadingService, ProgressUpdate, StartReading};
pub use domain::{
    Book, BookProgress, ChallengeProgress, ChallengeRate, ChallengeStatus, ChallengeType,
    CurrentlyReadingItem, LogEntryKind, Profile, ProfileInformation, ReadItem, ReadingChallenge,
    ReadingLogItem, TimeFrame,
};
pub use ports::{Clock, PortError, PortResult, ProfileStore, SystemClock};
pub use profile::ProfileService;
pub use reading_log::{LogEntryChanges, NewLogEntry, ReadingLogService};
pub use service::{ServiceConfig, ServiceContext, ServiceError, ServiceResult};
