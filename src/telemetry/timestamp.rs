//! Record timestamp parsing and ISO-8601 rendering.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Serialize, Serializer};

/// Naive layouts tried in order after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Offset-carrying layouts that are not strict RFC 3339.
const ZONED_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// A telemetry timestamp, with or without a UTC offset.
///
/// AIS exports usually carry naive UTC times; zoned inputs keep their offset
/// so the emitted string round-trips what the table said.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTime {
    /// Wall-clock time without offset.
    Naive(NaiveDateTime),
    /// Time with an explicit offset.
    Zoned(DateTime<FixedOffset>),
}

impl RecordTime {
    /// Parse a timestamp cell. Returns `None` for unrecognised layouts.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
            return Some(Self::Zoned(zoned));
        }

        if let Some(zoned) = ZONED_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(value, fmt).ok())
        {
            return Some(Self::Zoned(zoned));
        }

        if let Some(naive) = NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        {
            return Some(Self::Naive(naive));
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(|date| Self::Naive(date.and_time(NaiveTime::MIN)))
    }

    /// Render as ISO-8601. Fractional seconds appear only when non-zero.
    pub fn to_iso8601(&self) -> String {
        match self {
            Self::Naive(naive) => naive.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            Self::Zoned(zoned) => zoned.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string(),
        }
    }
}

impl std::fmt::Display for RecordTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for RecordTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}
