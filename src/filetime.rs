//! Directory timestamp conversion
//!
//! Active Directory stores times such as `pwdLastSet` and
//! `lastLogonTimestamp` as Windows FILETIME values: 100-nanosecond ticks
//! since 1601-01-01 UTC. Only whole seconds are modeled here.

use chrono::{DateTime, Duration, Utc};

/// Days between 1601-01-01 and 1970-01-01 (89 leap days in that span)
const EPOCH_OFFSET_DAYS: i64 = (1970 - 1601) * 365 + 89;

/// Seconds between the directory epoch and the Unix epoch
pub const EPOCH_OFFSET_SECS: i64 = EPOCH_OFFSET_DAYS * 86_400;

/// FILETIME ticks per second
pub const TICKS_PER_SECOND: i64 = 10_000_000;

/// Convert Unix epoch seconds to directory ticks. Saturates at the bounds of
/// `i64`; use [`checked_unix_to_directory_time`] to detect that case.
pub fn unix_to_directory_time(unix_seconds: i64) -> i64 {
    unix_seconds
        .saturating_add(EPOCH_OFFSET_SECS)
        .saturating_mul(TICKS_PER_SECOND)
}

/// Convert Unix epoch seconds to directory ticks, or `None` if the result
/// does not fit in an `i64`.
pub fn checked_unix_to_directory_time(unix_seconds: i64) -> Option<i64> {
    unix_seconds
        .checked_add(EPOCH_OFFSET_SECS)?
        .checked_mul(TICKS_PER_SECOND)
}

/// Convert directory ticks to Unix epoch seconds, truncating sub-second ticks.
pub fn directory_to_unix_time(ticks: i64) -> i64 {
    ticks / TICKS_PER_SECOND - EPOCH_OFFSET_SECS
}

/// Directory ticks for the instant `days` days before `now`, or `None` when
/// that instant cannot be represented.
pub fn cutoff_ticks(now: DateTime<Utc>, days: u32) -> Option<i64> {
    let cutoff = Duration::try_days(i64::from(days)).and_then(|d| now.checked_sub_signed(d))?;
    checked_unix_to_directory_time(cutoff.timestamp())
}

/// Render a FILETIME for logging. AD uses 0 for "never set".
pub fn directory_time_to_rfc3339(ticks: i64) -> String {
    if ticks == 0 {
        return "Never".to_string();
    }

    DateTime::from_timestamp(directory_to_unix_time(ticks), 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "Invalid timestamp".to_string())
}
