//! Timestamp conversion.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CalendiffError;
use crate::model::TimeField;

/// Seconds between the unix epoch and the export origin (2000-01-01T00:00:00Z).
pub const ORIGIN_OFFSET_SECS: i64 = 946_684_800;

/// Largest unix second accepted for conversion (2^53 - 1).
pub const MAX_SAFE_UNIX_SECS: i64 = (1 << 53) - 1;

const JST_OFFSET_SECS: i32 = 9 * 3600;

/// Display time zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Zone {
    #[default]
    Utc,
    /// Japan Standard Time, fixed UTC+09:00 (no DST)
    Jst,
}

impl Zone {
    pub fn offset(&self) -> FixedOffset {
        match self {
            Zone::Utc => Utc.fix(),
            Zone::Jst => FixedOffset::east_opt(JST_OFFSET_SECS).unwrap_or(Utc.fix()),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Utc => "UTC",
            Zone::Jst => "JST",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = CalendiffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTC" => Ok(Zone::Utc),
            "JST" | "ASIA/TOKYO" => Ok(Zone::Jst),
            _ => Err(CalendiffError::UnknownTimezone {
                name: s.to_string(),
            }),
        }
    }
}

/// Convert an origin-shifted timestamp into a zoned datetime.
///
/// Unparsed values, values past [`MAX_SAFE_UNIX_SECS`] and values chrono
/// cannot represent yield `None`.
pub fn to_datetime(value: &TimeField, zone: Zone) -> Option<DateTime<FixedOffset>> {
    let unix = value.instant()?.checked_add(ORIGIN_OFFSET_SECS)?;
    if unix > MAX_SAFE_UNIX_SECS {
        return None;
    }
    let utc = DateTime::from_timestamp(unix, 0)?;
    Some(utc.with_timezone(&zone.offset()))
}

/// Render the span between two datetimes as `"{d}d {h}h"`.
///
/// Zero parts are omitted, so a span under an hour renders empty, as does a
/// negative or half-missing span.
pub fn format_duration(
    start: Option<&DateTime<FixedOffset>>,
    end: Option<&DateTime<FixedOffset>>,
) -> String {
    let (Some(start), Some(end)) = (start, end) else {
        return String::new();
    };
    let delta = end.signed_duration_since(*start);
    if delta.num_seconds() < 0 {
        return String::new();
    }
    let days = delta.num_days();
    let hours = (delta.num_seconds() - days * 86_400) / 3600;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    parts.join(" ")
}
