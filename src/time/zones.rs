//! Time zone conversion helpers.
//!
//! All bucket math happens in UTC. Local times only appear when asking a calendar
//! whether it is open, when stamping bars in a data time zone, and when a config file
//! gives a naive local start/end.
//!
//! Notes:
//! - Ambiguous local times happen during "fall back" when a wall time occurs twice.
//! - Nonexistent local times happen during "spring forward" when a wall time is skipped.

use chrono::offset::LocalResult;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::error::{Result, SynthError};

/// Policy for handling DST edge cases when converting local naive timestamps to UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DstPolicy {
    /// Error on ambiguous (fall-back) or nonexistent (spring-forward) local times.
    Strict,
    /// For ambiguous local times pick the earlier instant.
    PreferEarliest,
    /// For ambiguous local times pick the later instant.
    PreferLatest,
}

/// Wall-clock time of `instant` in `tz`.
pub fn convert_from_utc(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Convert a naive local timestamp in `tz` to UTC.
///
/// Nonexistent local times always error; ambiguous ones are resolved by `policy`.
pub fn convert_to_utc(naive: NaiveDateTime, tz: Tz, policy: DstPolicy) -> Result<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(a, b) => match policy {
            DstPolicy::PreferEarliest => Ok(a.with_timezone(&Utc)),
            DstPolicy::PreferLatest => Ok(b.with_timezone(&Utc)),
            DstPolicy::Strict => Err(SynthError::AmbiguousLocalTime(format!("{} in {}", naive, tz))),
        },
        LocalResult::None => Err(SynthError::NonexistentLocalTime(format!("{} in {}", naive, tz))),
    }
}

/// Parse an IANA zone name such as "America/New_York".
pub fn parse_time_zone(name: &str) -> Result<Tz> {
    name.trim()
        .parse::<Tz>()
        .map_err(|_| SynthError::UnknownTimeZone(name.to_string()))
}

/// Parse a config timestamp.
///
/// RFC-3339 strings carry their own offset. Anything else is read as a naive local
/// time (`YYYY-MM-DD HH:MM[:SS]`, `T` separator allowed) in `local_tz`.
pub fn parse_instant(s: &str, local_tz: Tz) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    const FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ];
    let naive = FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .ok_or_else(|| SynthError::InvalidTimestamp(s.to_string()))?;

    convert_to_utc(naive, local_tz, DstPolicy::Strict)
}
