//! Telemetry row types.

use crate::telemetry::RecordTime;

/// One table row as read, before feature derivation.
///
/// Numeric cells that are empty, non-numeric or `NaN` are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTelemetryRow {
    /// 0-based data row index within the source table.
    pub row_index: usize,
    /// Raw timestamp cell.
    pub timestamp: Option<String>,
    /// Speed over ground.
    pub sog: Option<f64>,
    /// Course over ground.
    pub cog: Option<f64>,
    /// Latitude.
    pub lat: Option<f64>,
    /// Longitude.
    pub lon: Option<f64>,
}

/// A complete record with its derived speed change.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    /// 0-based data row index within the source table.
    pub row_index: usize,
    /// Parsed timestamp.
    pub timestamp: RecordTime,
    /// Speed over ground.
    pub sog: f64,
    /// Course over ground.
    pub cog: f64,
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lon: f64,
    /// Absolute SOG difference to the preceding table row.
    pub speed_change: f64,
}

/// Map `NaN` to a missing value.
pub(crate) fn present(value: Option<f64>) -> Option<f64> {
    value.filter(|v| !v.is_nan())
}
