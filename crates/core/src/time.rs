//! Raw and activity-adjusted post age.

use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;

use curator_config::ActivityConfig;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;
const MINUTES_PER_DAY: i64 = 1_440;

/// Absorbs float accumulation error before flooring, so that e.g. 100
/// off-peak minutes at 0.6 yield 60 rather than 59.
const WEIGHT_TOLERANCE: f64 = 1e-9;

/// Both measures of a post's age at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Exposure {
    pub elapsed_minutes: i64,
    pub adjusted_minutes: i64,
}

impl Exposure {
    pub fn measure(created_utc: i64, now: DateTime<Utc>, curve: &ActivityConfig) -> Self {
        let elapsed_minutes = elapsed_minutes(created_utc, now);
        Self {
            elapsed_minutes,
            adjusted_minutes: adjusted_elapsed_minutes(created_utc, elapsed_minutes, curve),
        }
    }
}

/// Whole minutes between `created_utc` and `now`.
///
/// A creation time in the future (clock skew between us and the platform)
/// counts as zero minutes.
pub fn elapsed_minutes(created_utc: i64, now: DateTime<Utc>) -> i64 {
    (now.timestamp().saturating_sub(created_utc) / SECONDS_PER_MINUTE).max(0)
}

/// Re-weights `elapsed_minutes` by the UTC hour each minute fell in.
///
/// Every whole minute starting at `created_utc` is classified; minutes
/// before `curve.peak_start_hour` count `off_peak_weight`, the rest count
/// `peak_weight`.  The sum is floored.
///
/// Any 24 hours contain every minute of the day exactly once, so whole days
/// are counted directly and only the remainder is walked.
pub fn adjusted_elapsed_minutes(created_utc: i64, elapsed_minutes: i64, curve: &ActivityConfig) -> i64 {
    let elapsed_minutes = elapsed_minutes.max(0);
    let whole_days = elapsed_minutes / MINUTES_PER_DAY;
    let off_peak_per_day = i64::from(curve.peak_start_hour.min(24)) * 60;

    let mut off_peak = whole_days.saturating_mul(off_peak_per_day);
    let mut peak = whole_days.saturating_mul(MINUTES_PER_DAY - off_peak_per_day);
    for minute in 0..elapsed_minutes % MINUTES_PER_DAY {
        let instant = created_utc.saturating_add(minute * SECONDS_PER_MINUTE);
        if hour_of_day(instant) < curve.peak_start_hour {
            off_peak += 1;
        } else {
            peak += 1;
        }
    }

    let weighted = off_peak as f64 * curve.off_peak_weight + peak as f64 * curve.peak_weight;
    (weighted + WEIGHT_TOLERANCE).floor().max(0.0) as i64
}

/// UTC hour (0–23) of a Unix timestamp.
pub fn hour_of_day(unix_secs: i64) -> u32 {
    match DateTime::from_timestamp(unix_secs, 0) {
        Some(instant) => instant.hour(),
        None => (unix_secs.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR) as u32,
    }
}
