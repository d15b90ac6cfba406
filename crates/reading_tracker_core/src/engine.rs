//! crates/reading_tracker_core/src/engine.rs
//!
//! The challenge progress engine. Every function here is pure: it works on the
//! values it is handed, takes `now` explicitly and never fails. Degenerate
//! inputs (zero-length challenges, challenges that have not started) resolve to
//! zero and `ON_TRACK` instead of dividing by zero.

use chrono::{DateTime, Utc};

use crate::domain::{
    ChallengeStatus, ChallengeType, LogEntryKind, Profile, ReadingChallenge, ReadingLogItem,
    TimeFrame,
};

/// Absolute deviation, in target units, still reported as on track.
pub const ON_TRACK_TOLERANCE: f64 = 0.15;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Display unit for a challenge, e.g. `"books/month"`.
pub fn rate_unit(challenge_type: ChallengeType, time_frame: TimeFrame) -> String {
    format!("{}/{}", challenge_type.unit_label(), time_frame.unit_label())
}

/// Pace needed to hit the target between the start and end dates.
pub fn compute_required_rate(challenge: &ReadingChallenge) -> (f64, String) {
    let unit = rate_unit(challenge.challenge_type, challenge.time_frame);
    let span = hours_between(challenge.start_date, challenge.end_date)
        / challenge.time_frame.hours_per_unit();
    if span <= 0.0 {
        return (0.0, unit);
    }
    (round2(challenge.target as f64 / span), unit)
}

/// Sums up the log entries dated inside the challenge window (both ends
/// inclusive). Books challenges count finished books, pages challenges add up
/// `pages_read` as recorded, negative corrections included. The page sum
/// saturates at the `i64` bounds.
pub fn aggregate_progress(challenge: &ReadingChallenge, log: &[ReadingLogItem]) -> i64 {
    let in_window = log
        .iter()
        .filter(|entry| entry.date >= challenge.start_date && entry.date <= challenge.end_date);

    match challenge.challenge_type {
        ChallengeType::Books => in_window
            .filter(|entry| entry.effective_kind() == LogEntryKind::Finished)
            .count() as i64,
        ChallengeType::Pages => in_window
            .map(|entry| entry.pages_read)
            .fold(0i64, |total, pages| total.saturating_add(pages)),
    }
}

/// Average pace since the start date, from the already aggregated
/// `progress.current`.
pub fn calculate_current_pace(challenge: &ReadingChallenge, now: DateTime<Utc>) -> f64 {
    let elapsed = hours_between(challenge.start_date, now);
    if elapsed <= 0.0 {
        return 0.0;
    }

    let divisor = elapsed / challenge.time_frame.hours_per_unit();
    if divisor <= 0.0 {
        return 0.0;
    }

    round2(challenge.progress.current as f64 / divisor)
}

/// Compares `progress.current` with a linear schedule from zero at the start
/// date to `target` at the end date.
///
/// Returns the rounded magnitude of the deviation and its direction. The
/// schedule keeps its slope past the end date, so an unfinished challenge
/// falls further behind the longer it stays open.
pub fn calculate_schedule_status(
    challenge: &ReadingChallenge,
    now: DateTime<Utc>,
) -> (f64, ChallengeStatus) {
    if now < challenge.start_date {
        return (0.0, ChallengeStatus::OnTrack);
    }

    let total = (challenge.end_date - challenge.start_date).num_milliseconds();
    if total <= 0 {
        return (0.0, ChallengeStatus::OnTrack);
    }

    let elapsed = (now - challenge.start_date).num_milliseconds();
    let expected = challenge.target as f64 * (elapsed as f64 / total as f64);
    let diff = challenge.progress.current as f64 - expected;

    if diff.abs() <= ON_TRACK_TOLERANCE {
        (0.0, ChallengeStatus::OnTrack)
    } else if diff > 0.0 {
        (round2(diff), ChallengeStatus::Ahead)
    } else {
        (round2(diff.abs()), ChallengeStatus::Behind)
    }
}

/// Recomputes every derived progress field of `challenge` from `log`.
///
/// The steps run in order since pace and status read the freshly aggregated
/// `current`. The required rate is left alone; it only depends on the
/// challenge parameters and is set when those change.
pub fn recompute(
    mut challenge: ReadingChallenge,
    log: &[ReadingLogItem],
    now: DateTime<Utc>,
) -> ReadingChallenge {
    let current = aggregate_progress(&challenge, log);
    challenge.progress.current = current;

    let percentage = if challenge.target != 0 {
        current as f64 * 100.0 / challenge.target as f64
    } else {
        0.0
    };
    challenge.progress.percentage = percentage;
    challenge.progress.display_percentage = percentage.clamp(0.0, 100.0);

    challenge.progress.rate.current_pace = calculate_current_pace(&challenge, now);

    let (schedule_diff, status) = calculate_schedule_status(&challenge, now);
    challenge.progress.rate.schedule_diff = schedule_diff;
    challenge.progress.rate.status = status;

    challenge.updated_at = now;
    challenge
}

/// Recomputes every challenge in `profile` that is not complete yet.
///
/// Completed challenges (percentage at or above 100) are frozen. Returns the
/// number of challenges recomputed.
pub fn refresh_all_challenges(profile: &mut Profile, now: DateTime<Utc>) -> usize {
    let log = &profile.reading_log;
    let mut refreshed = 0;

    for challenge in profile.challenges.iter_mut() {
        if challenge.progress.is_complete() {
            continue;
        }
        *challenge = recompute(challenge.clone(), log, now);
        refreshed += 1;
    }

    refreshed
}
