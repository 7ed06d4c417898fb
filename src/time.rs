//! Time and Timezone Utilities Module
//!
//! Turns the user's local date, wall-clock time and zone choice into a single
//! fixed-offset timestamp, and formats durations for display.

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use iana_time_zone::get_timezone;
use std::sync::OnceLock;
use tracing::warn;
use tzf_rs::DefaultFinder;

use crate::error::SolarError;

// tzf-rs DefaultFinder is pre-compiled and very fast
static TZF_FINDER: OnceLock<DefaultFinder> = OnceLock::new();

// ===================== ZONES =====================

/// Where the UTC offset of the timestamp comes from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    /// Plain UTC offset in hours (may be fractional, e.g. 5.5)
    Offset(f64),
    /// Named IANA zone with historical DST rules
    Named(Tz),
}

impl Zone {
    /// Resolve a zone argument: "system", "location" or an IANA name.
    ///
    /// Unknown names fall back to UTC with a warning.
    pub fn from_name(name: &str, lon: f64, lat: f64) -> Self {
        let tz = match name {
            "system" => system_timezone(),
            "location" => resolve_timezone(lon, lat),
            other => other.parse().unwrap_or_else(|_| {
                warn!(zone = other, "unknown time zone, using UTC");
                Tz::UTC
            }),
        };
        Zone::Named(tz)
    }

    pub fn label(&self) -> String {
        match self {
            Zone::Offset(h) => format!("UTC{:+}", h),
            Zone::Named(tz) => tz.name().to_string(),
        }
    }
}

/// Convert a UTC offset in hours into a chrono offset.
///
/// Rounds to whole seconds so offsets such as +5.75 (Nepal) are exact.
pub fn offset_from_hours(hours: f64) -> Result<FixedOffset, SolarError> {
    if !hours.is_finite() {
        return Err(SolarError::InvalidOffset(hours));
    }
    let seconds = (hours * 3600.0).round() as i32;
    FixedOffset::east_opt(seconds).ok_or(SolarError::InvalidOffset(hours))
}

/// Combine a local calendar date and wall-clock time into a timestamp.
///
/// Ambiguous wall times (DST fall-back) take the earlier instant.
/// Wall times inside a DST gap are rejected.
pub fn resolve_local(
    zone: Zone,
    date: NaiveDate,
    time: NaiveTime,
) -> Result<DateTime<FixedOffset>, SolarError> {
    let naive = date.and_time(time);
    match zone {
        Zone::Offset(hours) => {
            let offset = offset_from_hours(hours)?;
            offset
                .from_local_datetime(&naive)
                .single()
                .ok_or(SolarError::NonexistentLocalTime { date, time })
        }
        Zone::Named(tz) => match tz.from_local_datetime(&naive) {
            LocalResult::Single(t) => Ok(t.fixed_offset()),
            LocalResult::Ambiguous(t1, t2) => {
                warn!(
                    "time {} is ambiguous (DST transition), using {} rather than {}",
                    time.format("%H:%M:%S"),
                    t1.format("%H:%M:%S %Z"),
                    t2.format("%H:%M:%S %Z")
                );
                Ok(t1.fixed_offset())
            }
            LocalResult::None => Err(SolarError::NonexistentLocalTime { date, time }),
        },
    }
}

/// The current instant expressed in the given zone.
pub fn now_in(zone: Zone) -> Result<DateTime<FixedOffset>, SolarError> {
    let now = chrono::Utc::now();
    match zone {
        Zone::Offset(hours) => Ok(now.with_timezone(&offset_from_hours(hours)?)),
        Zone::Named(tz) => Ok(now.with_timezone(&tz).fixed_offset()),
    }
}

// ===================== TIME PARSING =====================

/// Parse a time string in HH:MM[:SS[.fffffffff]] format.
///
/// # Errors
/// Returns an error if the time format is invalid
pub fn parse_time_ns(s: &str) -> Result<NaiveTime, String> {
    // %.f accepts up to nanosecond precision
    let formats = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

    for fmt in formats {
        if let Ok(t) = NaiveTime::parse_from_str(s, fmt) {
            return Ok(t);
        }
    }
    Err(format!("Invalid time '{}'. Use HH:MM, HH:MM:SS, HH:MM:SS.ns or \"now\"", s))
}

// ===================== TIMEZONE UTILITIES =====================

/// Get the system's configured timezone.
///
/// Falls back to UTC if the system timezone cannot be determined.
pub fn system_timezone() -> Tz {
    get_timezone().ok().and_then(|s| s.parse().ok()).unwrap_or(Tz::UTC)
}

/// Resolve timezone from geographic coordinates.
///
/// # Returns
/// The resolved timezone, or UTC if resolution fails
pub fn resolve_timezone(lon: f64, lat: f64) -> Tz {
    let finder = TZF_FINDER.get_or_init(DefaultFinder::new);
    let tzid = finder.get_tz_name(lon, lat);
    tzid.parse::<Tz>().unwrap_or(Tz::UTC)
}

// ===================== FORMATTING =====================

/// Format a day length in seconds as "Hh Mm".
///
/// Seconds are truncated, matching a clock-style display.
pub fn format_day_length(seconds: i64) -> String {
    let total = seconds.max(0);
    let h = total / 3600;
    let m = (total % 3600) / 60;
    format!("{}h {}m", h, m)
}

// ===================== TESTS =====================
