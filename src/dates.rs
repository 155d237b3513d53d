//! Day-granularity date helpers
//!
//! Every schedule comparison goes through these functions so that intra-day
//! drift never shifts a due date by one. All days are UTC calendar days.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Mean length of a year in days, leap years included
pub const DAYS_PER_YEAR: f64 = 365.25;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Midnight (UTC) of the day containing `at`
pub fn start_of_day(at: DateTime<Utc>) -> DateTime<Utc> {
    at.date_naive().and_time(NaiveTime::MIN).and_utc()
}

/// Shift a timestamp forward by whole days, keeping its time of day
pub fn add_days(at: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    at + Duration::days(i64::from(days))
}

/// Signed number of calendar days from `earlier` to `later`
pub fn whole_days_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> i64 {
    (later.date_naive() - earlier.date_naive()).num_days()
}

/// Whole days `due` lies in the past relative to `now`, never negative
pub fn days_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let days = whole_days_between(due, now).max(0);
    u32::try_from(days).unwrap_or(u32::MAX)
}

/// True when `due` falls on or before the day containing `now`
pub fn is_due_by_today(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due.date_naive() <= now.date_naive()
}

/// Completed years between `since` and `now` (negative if `since` is in the future)
pub fn age_in_years(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (now - since).num_seconds() as f64;
    (seconds / (DAYS_PER_YEAR * SECONDS_PER_DAY)).floor() as i64
}
